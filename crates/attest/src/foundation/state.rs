//! The per-chain validation state shared between a validator and its views.
//!
//! Usage errors (blank names, names containing whitespace, duplicate
//! context labels) panic immediately: they indicate a bug in the calling
//! code, are never recorded as failures, and are never suppressed by
//! collecting mode.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::config::Config;
use crate::foundation::failure::{Failure, FailureKind, Failures};
use crate::message::MessageBuilder;
use crate::render::value::Value;

/// State of one validation chain: `Active` until a fatal precondition
/// failure (or, in eager mode, any failure) trips the shared flag, after
/// which every check on every view of the chain is a no-op.
///
/// Clones share the failure list and the fatal flag by reference — that is
/// what makes views accumulate into one ordered result.
#[derive(Debug, Clone)]
pub(crate) struct ValidatorState {
    name: String,
    config: Config,
    validator_context: IndexMap<String, Value>,
    global_context: Vec<(String, Value)>,
    failures: Arc<RwLock<Vec<Failure>>>,
    fatal: Arc<AtomicBool>,
}

impl ValidatorState {
    pub(crate) fn new(
        name: impl Into<String>,
        config: Config,
        global_context: Vec<(String, Value)>,
    ) -> Self {
        let name = name.into();
        require_valid_name(&name, "name");
        Self {
            name,
            config,
            validator_context: IndexMap::new(),
            global_context,
            failures: Arc::new(RwLock::new(Vec::new())),
            fatal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A view over a derived value (`length()`, `keys()`): same failure
    /// list, same fatal flag, new name.
    pub(crate) fn view(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: self.config.clone(),
            validator_context: self.validator_context.clone(),
            global_context: self.global_context.clone(),
            failures: Arc::clone(&self.failures),
            fatal: Arc::clone(&self.fatal),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn is_fatal(&self) -> bool {
        self.fatal.load(Ordering::Acquire)
    }

    pub(crate) fn set_fatal(&self) {
        self.fatal.store(true, Ordering::Release);
    }

    /// Appends one failure. Eager chains halt after the first: the shared
    /// flag turns every later check into a no-op, so exactly one error
    /// surfaces per chain.
    pub(crate) fn record(&self, kind: FailureKind, builder: MessageBuilder) {
        let context = self.rendered_context();
        let (message, entries) = builder.assemble(context);
        tracing::trace!(kind = %kind, name = %self.name, "validation failure recorded");
        self.failures
            .write()
            .push(Failure::new(kind, message, entries));
        if self.config.throw_on_failure() {
            self.set_fatal();
        }
    }

    fn rendered_context(&self) -> Vec<(String, String)> {
        let mappers = self.config.mappers();
        self.validator_context
            .iter()
            .map(|(label, value)| (label.clone(), mappers.render(value)))
            .chain(
                self.global_context
                    .iter()
                    .map(|(label, value)| (label.clone(), mappers.render(value))),
            )
            .collect()
    }

    pub(crate) fn validation_failed(&self) -> bool {
        !self.failures.read().is_empty()
    }

    pub(crate) fn failures(&self) -> Failures {
        Failures::new(self.failures.read().clone())
    }

    /// Adds a contextual entry shown by every subsequent failure of this
    /// chain. The label must not collide with the subject name or an
    /// existing entry.
    pub(crate) fn add_context(&mut self, label: impl Into<String>, value: Value) {
        let label = label.into();
        require_valid_name(&label, "name");
        assert!(
            label != self.name,
            "the name \"{label}\" is already in use by the value being validated; \
             choose a different name"
        );
        assert!(
            !self.validator_context.contains_key(&label),
            "the name \"{label}\" is already in use by the validator context; \
             choose a different name"
        );
        self.validator_context.insert(label, value);
    }
}

/// Usage-error gate for subject and context names.
pub(crate) fn require_valid_name(name: &str, what: &str) {
    assert!(!name.is_empty(), "{what} may not be empty");
    assert!(
        !name.chars().any(char::is_whitespace),
        "{what} may not contain whitespace"
    );
}
