//! Per-chain configuration snapshots.
//!
//! A [`Config`] is immutable for the life of a chain: factories clone the
//! shared configuration under a read lock at chain construction, so updates
//! committed later never apply retroactively.

use std::fmt;
use std::sync::Arc;

use crate::foundation::failure::ValidationError;
use crate::render::mappers::TypeMappers;

/// How two values are considered equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqualityMethod {
    /// Structural equality with kind distinction: `1` is not `1.0`.
    #[default]
    Exact,
    /// Natural-order equality across comparable kinds: `1` equals `1.0`.
    Comparable,
}

/// Rewrites an error before it is returned from a failed chain. Returning
/// the input unchanged is the identity transform; returning a foreign error
/// type gets it wrapped so it still propagates (see
/// [`ValidationError::source`](std::error::Error::source)).
pub type ErrorTransformer =
    Arc<dyn Fn(ValidationError) -> Box<dyn std::error::Error + Send + Sync> + Send + Sync>;

/// Determines the behavior of a validator chain.
#[derive(Clone)]
pub struct Config {
    allow_diff: bool,
    equality: EqualityMethod,
    mappers: TypeMappers,
    throw_on_failure: bool,
    error_transformer: ErrorTransformer,
}

impl Default for Config {
    /// The default configuration: diffs allowed, exact equality, built-in
    /// mappers, eager failure surfacing, identity transformer.
    fn default() -> Self {
        Self {
            allow_diff: true,
            equality: EqualityMethod::default(),
            mappers: TypeMappers::default(),
            throw_on_failure: true,
            error_transformer: identity_transformer(),
        }
    }
}

impl Config {
    /// `true` if failure messages may embed a diff of the actual and
    /// expected renderings.
    #[must_use]
    pub fn allow_diff(&self) -> bool {
        self.allow_diff
    }

    #[must_use]
    pub fn equality(&self) -> EqualityMethod {
        self.equality
    }

    /// The mapper registry snapshot used to render values in messages.
    #[must_use]
    pub fn mappers(&self) -> &TypeMappers {
        &self.mappers
    }

    /// `true` for eager chains: the first failure halts further checking
    /// and is the one surfaced by `into_result()`.
    #[must_use]
    pub fn throw_on_failure(&self) -> bool {
        self.throw_on_failure
    }

    #[must_use]
    pub fn error_transformer(&self) -> &ErrorTransformer {
        &self.error_transformer
    }

    #[must_use]
    pub(crate) fn with_allow_diff(mut self, allow_diff: bool) -> Self {
        self.allow_diff = allow_diff;
        self
    }

    #[must_use]
    pub(crate) fn with_equality(mut self, equality: EqualityMethod) -> Self {
        self.equality = equality;
        self
    }

    #[must_use]
    pub(crate) fn with_mappers(mut self, mappers: TypeMappers) -> Self {
        self.mappers = mappers;
        self
    }

    #[must_use]
    pub(crate) fn with_throw_on_failure(mut self, throw_on_failure: bool) -> Self {
        self.throw_on_failure = throw_on_failure;
        self
    }

    #[must_use]
    pub(crate) fn with_error_transformer(mut self, transformer: ErrorTransformer) -> Self {
        self.error_transformer = transformer;
        self
    }

    /// Runs the configured transformer, wrapping foreign output types so
    /// they propagate instead of being swallowed.
    pub(crate) fn transform_error(&self, error: ValidationError) -> ValidationError {
        match (self.error_transformer)(error).downcast::<ValidationError>() {
            Ok(own) => *own,
            Err(foreign) => ValidationError::wrapping(foreign),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("allow_diff", &self.allow_diff)
            .field("equality", &self.equality)
            .field("mappers", &self.mappers)
            .field("throw_on_failure", &self.throw_on_failure)
            .finish()
    }
}

/// The default transformer: every error passes through unchanged.
#[must_use]
pub fn identity_transformer() -> ErrorTransformer {
    Arc::new(|error| Box::new(error))
}
