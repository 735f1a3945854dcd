//! The fluent constraint surface.
//!
//! Every constraint method consumes and returns the validator, appending at
//! most one failure record. Once the chain's shared fatal flag is set —
//! by a null subject, a kind mismatch, or any failure in eager mode —
//! every later check is a no-op, preventing cascades of misleading
//! secondary failures.

use crate::foundation::failure::{FailureKind, Failures, ValidationError};
use crate::foundation::state::ValidatorState;
use crate::message::{MessageBuilder, quote_name};
use crate::render::value::{IntoValue, SetHandle, Value};

use std::cmp::Ordering;

/// Validates a single named subject.
///
/// Produced by [`Validators::require_that`], [`Validators::assert_that`] or
/// [`Validators::check_if`]; finished with [`failures`](Self::failures) or
/// [`into_result`](Self::into_result).
///
/// [`Validators::require_that`]: crate::factory::Validators::require_that
/// [`Validators::assert_that`]: crate::factory::Validators::assert_that
/// [`Validators::check_if`]: crate::factory::Validators::check_if
#[derive(Debug)]
pub struct Validator {
    state: ValidatorState,
    value: Value,
}

impl Validator {
    pub(crate) fn new(state: ValidatorState, value: Value) -> Self {
        Self { state, value }
    }

    /// The subject's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// The subject's value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// `true` if any failure has been recorded on this chain.
    #[must_use]
    pub fn validation_failed(&self) -> bool {
        self.state.validation_failed()
    }

    // ------------------------------------------------------------------
    // nullability
    // ------------------------------------------------------------------

    /// Ensures the subject is not null. A null subject records one failure
    /// and disables every later check on this chain.
    pub fn is_not_null(self) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        if self.value.is_null() {
            return self.fail_on_null(None);
        }
        self
    }

    /// Ensures the subject is null.
    pub fn is_null(self) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        if self.value.is_null() {
            return self;
        }
        let builder = MessageBuilder::new(format!("{} must be null", self.quoted()))
            .with_value(self.state.config(), "actual", &self.value);
        self.fail(FailureKind::IllegalArgument, builder)
    }

    // ------------------------------------------------------------------
    // booleans
    // ------------------------------------------------------------------

    /// Ensures the subject is `true`.
    pub fn is_true(self) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let message = format!("{} must be true", self.quoted());
        match &self.value {
            Value::Bool(true) => self,
            Value::Bool(false) => self.fail(FailureKind::IllegalArgument, MessageBuilder::new(message)),
            Value::Null => self.fail_on_null(Some((
                FailureKind::IllegalArgument,
                MessageBuilder::new(message),
            ))),
            _ => self.fail_wrong_kind("a boolean"),
        }
    }

    /// Ensures the subject is `false`.
    pub fn is_false(self) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let message = format!("{} must be false", self.quoted());
        match &self.value {
            Value::Bool(false) => self,
            Value::Bool(true) => self.fail(FailureKind::IllegalArgument, MessageBuilder::new(message)),
            Value::Null => self.fail_on_null(Some((
                FailureKind::IllegalArgument,
                MessageBuilder::new(message),
            ))),
            _ => self.fail_wrong_kind("a boolean"),
        }
    }

    // ------------------------------------------------------------------
    // equality
    // ------------------------------------------------------------------

    /// Ensures the subject equals `expected` under the configured equality
    /// method. Inequality failures embed a rendered comparison, with a
    /// diff when the renderings warrant one.
    pub fn is_equal_to(self, expected: impl IntoValue) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let expected = expected.into_value();
        let config = self.state.config();
        if self.value.equals(&expected, config.equality()) {
            return self;
        }
        let builder = MessageBuilder::new(format!(
            "{} must be equal to {}",
            self.quoted(),
            config.mappers().render(&expected)
        ))
        .with_comparison(config, &self.value, &expected);
        self.fail(FailureKind::IllegalArgument, builder)
    }

    /// Ensures the subject does not equal `unwanted`.
    pub fn is_not_equal_to(self, unwanted: impl IntoValue) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let unwanted = unwanted.into_value();
        let config = self.state.config();
        if !self.value.equals(&unwanted, config.equality()) {
            return self;
        }
        let builder = MessageBuilder::new(format!(
            "{} may not be equal to {}",
            self.quoted(),
            config.mappers().render(&unwanted)
        ))
        .with_value(config, "actual", &self.value);
        self.fail(FailureKind::IllegalArgument, builder)
    }

    // ------------------------------------------------------------------
    // comparisons
    // ------------------------------------------------------------------

    /// Ensures the subject is strictly less than `bound`.
    pub fn is_less_than(self, bound: impl IntoValue) -> Self {
        self.compare(bound.into_value(), "less than", |ordering| {
            ordering == Ordering::Less
        })
    }

    /// Ensures the subject is at most `bound`.
    pub fn is_less_than_or_equal_to(self, bound: impl IntoValue) -> Self {
        self.compare(bound.into_value(), "less than or equal to", |ordering| {
            ordering != Ordering::Greater
        })
    }

    /// Ensures the subject is strictly greater than `bound`.
    pub fn is_greater_than(self, bound: impl IntoValue) -> Self {
        self.compare(bound.into_value(), "greater than", |ordering| {
            ordering == Ordering::Greater
        })
    }

    /// Ensures the subject is at least `bound`.
    pub fn is_greater_than_or_equal_to(self, bound: impl IntoValue) -> Self {
        self.compare(bound.into_value(), "greater than or equal to", |ordering| {
            ordering != Ordering::Less
        })
    }

    /// Ensures the subject lies in `[minimum, maximum]`.
    pub fn is_between(self, minimum: impl IntoValue, maximum: impl IntoValue) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let minimum = minimum.into_value();
        let maximum = maximum.into_value();
        let config = self.state.config();
        let message = format!(
            "{} must be between {} and {}",
            self.quoted(),
            config.mappers().render(&minimum),
            config.mappers().render(&maximum)
        );
        if self.value.is_null() {
            return self.fail_on_null(Some((
                FailureKind::IllegalArgument,
                MessageBuilder::new(message),
            )));
        }
        match (
            self.value.natural_cmp(&minimum),
            self.value.natural_cmp(&maximum),
        ) {
            (Some(lo), Some(hi)) if lo != Ordering::Less && hi != Ordering::Greater => self,
            (Some(_), Some(_)) => {
                let builder = MessageBuilder::new(message).with_value(config, "actual", &self.value);
                self.fail(FailureKind::IllegalArgument, builder)
            }
            _ => {
                let rendered = format!(
                    "comparable to {} and {}",
                    config.mappers().render(&minimum),
                    config.mappers().render(&maximum)
                );
                self.fail_wrong_kind(&rendered)
            }
        }
    }

    // ------------------------------------------------------------------
    // emptiness and membership
    // ------------------------------------------------------------------

    /// Ensures the subject (string, list, set or map) has no elements.
    pub fn is_empty(self) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let message = format!("{} must be empty", self.quoted());
        if self.value.is_null() {
            return self.fail_on_null(Some((
                FailureKind::IllegalArgument,
                MessageBuilder::new(message),
            )));
        }
        match self.value.length() {
            Some(0) => self,
            Some(length) => {
                let builder = MessageBuilder::new(message)
                    .with_value(self.state.config(), "actual", &self.value)
                    .with_entry("actual.length", length.to_string());
                self.fail(FailureKind::IllegalArgument, builder)
            }
            None => self.fail_wrong_kind("a string, list, set or map"),
        }
    }

    /// Ensures the subject (string, list, set or map) has elements.
    pub fn is_not_empty(self) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let message = format!("{} may not be empty", self.quoted());
        if self.value.is_null() {
            return self.fail_on_null(Some((
                FailureKind::IllegalArgument,
                MessageBuilder::new(message),
            )));
        }
        match self.value.length() {
            Some(0) => self.fail(FailureKind::IllegalArgument, MessageBuilder::new(message)),
            Some(_) => self,
            None => self.fail_wrong_kind("a string, list, set or map"),
        }
    }

    /// Ensures the subject contains `expected`: a substring for strings, an
    /// element (under the configured equality) for lists and sets.
    pub fn contains(self, expected: impl IntoValue) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let expected = expected.into_value();
        let config = self.state.config();
        let message = format!(
            "{} must contain {}",
            self.quoted(),
            config.mappers().render(&expected)
        );
        if self.value.is_null() {
            return self.fail_on_null(Some((
                FailureKind::IllegalArgument,
                MessageBuilder::new(message),
            )));
        }
        let holds = match (&self.value, &expected) {
            (Value::Str(text), Value::Str(substring)) => text.contains(substring.as_str()),
            (Value::Str(_), _) => false,
            (Value::List(list), _) => list
                .snapshot()
                .iter()
                .any(|item| item.equals(&expected, config.equality())),
            (Value::Set(set), _) => set
                .snapshot()
                .iter()
                .any(|item| item.equals(&expected, config.equality())),
            _ => return self.fail_wrong_kind("a string, list or set"),
        };
        if holds {
            self
        } else {
            let builder = MessageBuilder::new(message).with_value(config, "actual", &self.value);
            self.fail(FailureKind::IllegalArgument, builder)
        }
    }

    // ------------------------------------------------------------------
    // views
    // ------------------------------------------------------------------

    /// A validator over the subject's element or character count, named
    /// `<name>.length()`. Shares this chain's failure state: failures
    /// recorded through either side land in the same ordered list.
    pub fn length(self) -> Self {
        let name = format!("{}.length()", self.state.name());
        if self.state.is_fatal() {
            let state = self.state.view(name);
            return Self::new(state, Value::Null);
        }
        match self.value.length() {
            Some(length) => {
                let state = self.state.view(name);
                Self::new(state, Value::UInt(length))
            }
            None => {
                let failed = if self.value.is_null() {
                    self.fail_on_null(None)
                } else {
                    self.fail_wrong_kind("a string, list, set or map")
                };
                let state = failed.state.view(name);
                Self::new(state, Value::Null)
            }
        }
    }

    /// A validator over a map subject's keys, named `<name>.keys()`.
    /// Shares this chain's failure state.
    pub fn keys(self) -> Self {
        let name = format!("{}.keys()", self.state.name());
        if self.state.is_fatal() {
            let state = self.state.view(name);
            return Self::new(state, Value::Null);
        }
        match &self.value {
            Value::Map(map) => {
                let keys = SetHandle::from_items(None, map.is_ordered(), map.keys());
                let state = self.state.view(name);
                Self::new(state, Value::Set(keys))
            }
            Value::Null => {
                let failed = self.fail_on_null(None);
                let state = failed.state.view(name);
                Self::new(state, Value::Null)
            }
            _ => {
                let failed = self.fail_wrong_kind("a map");
                let state = failed.state.view(name);
                Self::new(state, Value::Null)
            }
        }
    }

    // ------------------------------------------------------------------
    // context and terminals
    // ------------------------------------------------------------------

    /// Attaches a contextual entry shown by every subsequent failure of
    /// this chain. The label must be non-blank, free of whitespace, and
    /// not already in use.
    pub fn with_context(mut self, value: impl IntoValue, label: impl Into<String>) -> Self {
        self.state.add_context(label, value.into_value());
        self
    }

    /// Records a custom failure, for constraints implemented outside this
    /// crate. Respects the chain's state like any built-in check: a fatal
    /// chain ignores the call, and an eager chain halts after it.
    pub fn record_failure(
        self,
        kind: FailureKind,
        message: impl Into<String>,
        context: &[(&str, &str)],
    ) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let mut builder = MessageBuilder::new(message.into());
        for (label, value) in context {
            builder = builder.with_entry(*label, *value);
        }
        self.fail(kind, builder)
    }

    /// The failures recorded so far, in order.
    #[must_use]
    pub fn failures(&self) -> Failures {
        self.state.failures()
    }

    /// The failure messages recorded so far, each independently complete.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.state.failures().messages()
    }

    /// Finishes the chain. Eager chains return their first (only surfaced)
    /// failure; collecting chains aggregate everything recorded. The
    /// configured error transformer runs on the way out.
    pub fn into_result(self) -> Result<(), ValidationError> {
        let failures = self.state.failures();
        if failures.is_empty() {
            return Ok(());
        }
        let error = if self.state.config().throw_on_failure() {
            let first = &failures.records()[0];
            ValidationError::new(first.kind(), first.message().to_owned())
        } else {
            match failures.into_error() {
                Some(error) => error,
                None => return Ok(()),
            }
        };
        Err(self.state.config().transform_error(error))
    }

    // ------------------------------------------------------------------
    // failure plumbing
    // ------------------------------------------------------------------

    fn quoted(&self) -> String {
        quote_name(self.state.name())
    }

    fn fail(self, kind: FailureKind, builder: MessageBuilder) -> Self {
        self.state.record(kind, builder);
        self
    }

    /// The null-subject transition: records the null-reference failure,
    /// then (in collecting mode) the failed constraint's own record, and
    /// trips the shared fatal flag.
    fn fail_on_null(self, own: Option<(FailureKind, MessageBuilder)>) -> Self {
        let message = format!("{} may not be null", self.quoted());
        self.state
            .record(FailureKind::NullReference, MessageBuilder::new(message));
        if let Some((kind, builder)) = own {
            if !self.state.is_fatal() {
                self.state.record(kind, builder);
            }
        }
        self.state.set_fatal();
        self
    }

    /// The wrong-kind transition: one type-mismatch record, then fatal.
    fn fail_wrong_kind(self, expected: &str) -> Self {
        let builder = MessageBuilder::new(format!("{} must be {expected}", self.quoted()))
            .with_value(self.state.config(), "actual", &self.value)
            .with_entry("actual.kind", self.value.kind().description());
        self.state.record(FailureKind::TypeMismatch, builder);
        self.state.set_fatal();
        self
    }

    fn compare(
        self,
        bound: Value,
        relation: &str,
        accept: impl Fn(Ordering) -> bool,
    ) -> Self {
        if self.state.is_fatal() {
            return self;
        }
        let config = self.state.config();
        let message = format!(
            "{} must be {relation} {}",
            self.quoted(),
            config.mappers().render(&bound)
        );
        if self.value.is_null() {
            return self.fail_on_null(Some((
                FailureKind::IllegalArgument,
                MessageBuilder::new(message),
            )));
        }
        match self.value.natural_cmp(&bound) {
            Some(ordering) if accept(ordering) => self,
            Some(_) => {
                let builder = MessageBuilder::new(message).with_value(config, "actual", &self.value);
                self.fail(FailureKind::IllegalArgument, builder)
            }
            None => {
                let rendered = format!("comparable to {}", config.mappers().render(&bound));
                self.fail_wrong_kind(&rendered)
            }
        }
    }
}
