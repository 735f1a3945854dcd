//! Failure records and the errors they resolve into.

use std::fmt;

use smallvec::SmallVec;

/// Ordered context entries attached to a failure. Most failures carry at
/// most an actual/diff/expected triple plus a context line or two.
pub(crate) type ContextEntries = SmallVec<[(String, String); 4]>;

// ============================================================================
// FAILURE KIND
// ============================================================================

/// Classifies a recorded failure. A tag, not an error type: the same kinds
/// drive both eager and collecting resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The subject was null/absent where a value was required.
    NullReference,
    /// The subject failed a stated constraint.
    IllegalArgument,
    /// The chain was used in a way its state does not allow.
    IllegalState,
    /// The subject had the wrong runtime kind for a cast-like operation.
    TypeMismatch,
    /// A failure elevated to "this should not happen" severity.
    AssertionFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::NullReference => "null reference",
            FailureKind::IllegalArgument => "illegal argument",
            FailureKind::IllegalState => "illegal state",
            FailureKind::TypeMismatch => "type mismatch",
            FailureKind::AssertionFailed => "assertion failed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// FAILURE RECORD
// ============================================================================

/// One recorded constraint violation. Immutable once constructed.
///
/// `message` is the fully assembled text (constraint sentence plus aligned
/// context lines); `context` preserves the individual entries in insertion
/// order for callers that want them as data.
#[derive(Debug, Clone)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    context: ContextEntries,
}

impl Failure {
    pub(crate) fn new(kind: FailureKind, message: String, context: ContextEntries) -> Self {
        Self {
            kind,
            message,
            context,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// The complete failure text, independently readable.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The context entries in insertion order.
    #[must_use]
    pub fn context(&self) -> impl Iterator<Item = (&str, &str)> {
        self.context.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================================
// FAILURE COLLECTION
// ============================================================================

/// The ordered list of failures recorded by one chain, handed back to the
/// caller by collecting mode.
#[derive(Debug, Clone, Default)]
pub struct Failures {
    failures: Vec<Failure>,
}

impl Failures {
    pub(crate) fn new(failures: Vec<Failure>) -> Self {
        Self { failures }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn records(&self) -> &[Failure] {
        &self.failures
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.failures.iter()
    }

    /// The failure messages in recording order, each independently complete.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.message.clone()).collect()
    }

    /// Collapses the recorded failures into a single error: one failure
    /// yields itself, several yield an aggregate listing every message.
    /// `None` when nothing was recorded.
    #[must_use]
    pub fn into_error(self) -> Option<ValidationError> {
        match self.failures.len() {
            0 => None,
            1 => {
                let failure = &self.failures[0];
                Some(ValidationError::new(failure.kind, failure.message.clone()))
            }
            _ => Some(ValidationError::new(
                FailureKind::IllegalArgument,
                self.to_string(),
            )),
        }
    }
}

impl<'a> IntoIterator for &'a Failures {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validation failed with {} failure(s):", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, failure.message)?;
        }
        Ok(())
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// The error surfaced at the end of a failed chain.
///
/// Carries the failure kind that produced it and, when an error transformer
/// substituted a foreign error type, that error as [`source`].
///
/// [`source`]: std::error::Error::source
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    kind: FailureKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ValidationError {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Re-tags this error with a different kind, keeping its message.
    #[must_use]
    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = kind;
        self
    }

    /// Wraps an error of a foreign type returned by a transformer so it
    /// still propagates instead of being silently swallowed.
    #[must_use]
    pub(crate) fn wrapping(foreign: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self {
            kind: FailureKind::AssertionFailed,
            message: format!(
                "the error transformer returned an unsupported error type; \
                 this should not happen, please report it: {foreign}"
            ),
            source: Some(foreign),
        }
    }
}
