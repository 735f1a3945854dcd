//! The validator factory: owns the shared configuration and the
//! process-wide context, and opens chains against immutable snapshots.
//!
//! `Validators` is an explicit object — construct one, share it by
//! reference (or `Arc`) wherever validation happens. Readers take brief
//! read locks and clone; a configuration update takes the write lock only
//! at commit, so chains already in flight keep the snapshot they were
//! built with.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{Config, EqualityMethod, ErrorTransformer};
use crate::foundation::failure::FailureKind;
use crate::foundation::state::{ValidatorState, require_valid_name};
use crate::render::mappers::MutableTypeMappers;
use crate::render::value::{IntoValue, Value};
use crate::validator::Validator;

/// Creates validators that share one configuration and context.
#[derive(Debug, Default)]
pub struct Validators {
    config: RwLock<Config>,
    context: RwLock<IndexMap<String, Value>>,
}

impl Validators {
    /// A factory with the default configuration and an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an eager chain: the first failure halts further checking and
    /// is the error returned by `into_result()`.
    pub fn require_that(&self, value: impl IntoValue, name: impl Into<String>) -> Validator {
        let config = self.config.read().clone().with_throw_on_failure(true);
        Validator::new(
            ValidatorState::new(name, config, self.context_snapshot()),
            value.into_value(),
        )
    }

    /// Opens a collecting chain whose failures are elevated to
    /// assertion-level errors, for checks that guard internal invariants.
    pub fn assert_that(&self, value: impl IntoValue, name: impl Into<String>) -> Validator {
        let config = self
            .config
            .read()
            .clone()
            .with_throw_on_failure(false)
            .with_error_transformer(convert_to_assertion());
        Validator::new(
            ValidatorState::new(name, config, self.context_snapshot()),
            value.into_value(),
        )
    }

    /// Opens a collecting chain: failures accumulate silently and are
    /// retrieved with `failures()` / `messages()` or aggregated by
    /// `into_result()`.
    pub fn check_if(&self, value: impl IntoValue, name: impl Into<String>) -> Validator {
        let config = self.config.read().clone().with_throw_on_failure(false);
        Validator::new(
            ValidatorState::new(name, config, self.context_snapshot()),
            value.into_value(),
        )
    }

    /// The configuration used by newly opened chains.
    #[must_use]
    pub fn configuration(&self) -> Config {
        self.config.read().clone()
    }

    /// Starts a configuration update. Changes apply atomically, exactly
    /// once, when the updater is committed or dropped — including on
    /// panic paths. Chains opened before the commit are unaffected.
    #[must_use]
    pub fn update_configuration(&self) -> ConfigUpdater<'_> {
        ConfigUpdater::new(self)
    }

    /// Adds a process-wide context entry appended to every subsequent
    /// failure's context. The name must be non-blank, free of whitespace,
    /// and not already in use.
    pub fn with_context(&self, value: impl IntoValue, name: impl Into<String>) -> &Self {
        let name = name.into();
        require_valid_name(&name, "name");
        let mut context = self.context.write();
        assert!(
            !context.contains_key(&name),
            "the name \"{name}\" is already in use by the global context; \
             choose a different name"
        );
        context.insert(name, value.into_value());
        self
    }

    /// Removes a context entry. Unknown names are ignored.
    pub fn remove_context(&self, name: &str) -> &Self {
        self.context.write().shift_remove(name);
        self
    }

    /// The current context entries in insertion order.
    #[must_use]
    pub fn context(&self) -> Vec<(String, Value)> {
        self.context_snapshot()
    }

    fn context_snapshot(&self) -> Vec<(String, Value)> {
        self.context
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn apply(&self, config: Config) {
        *self.config.write() = config;
    }
}

/// Elevates every failure to an assertion-level error.
fn convert_to_assertion() -> ErrorTransformer {
    Arc::new(|error| Box::new(error.with_kind(FailureKind::AssertionFailed)))
}

// ============================================================================
// CONFIGURATION UPDATER
// ============================================================================

/// A mutable snapshot of the factory configuration.
///
/// Holds no lock while open, so an updater can freely read the
/// configuration it is mutating; the write lock is taken only for the
/// commit itself. Dropping an uncommitted updater commits it — the commit
/// fires exactly once on every exit path.
pub struct ConfigUpdater<'a> {
    owner: &'a Validators,
    allow_diff: bool,
    equality: EqualityMethod,
    mappers: MutableTypeMappers,
    error_transformer: ErrorTransformer,
    committed: bool,
}

impl<'a> ConfigUpdater<'a> {
    fn new(owner: &'a Validators) -> Self {
        let config = owner.configuration();
        Self {
            owner,
            allow_diff: config.allow_diff(),
            equality: config.equality(),
            mappers: MutableTypeMappers::from(config.mappers()),
            error_transformer: config.error_transformer().clone(),
            committed: false,
        }
    }

    /// Sets whether failure messages may embed diffs.
    pub fn allow_diff(&mut self, allow_diff: bool) -> &mut Self {
        self.allow_diff = allow_diff;
        self
    }

    /// Sets the equality method.
    pub fn equality(&mut self, equality: EqualityMethod) -> &mut Self {
        self.equality = equality;
        self
    }

    /// The mutable mapper registry; frozen back into the configuration at
    /// commit time.
    pub fn string_mappers(&mut self) -> &mut MutableTypeMappers {
        &mut self.mappers
    }

    /// Replaces the error transformer.
    pub fn error_transformer<F>(&mut self, transformer: F) -> &mut Self
    where
        F: Fn(crate::ValidationError) -> Box<dyn std::error::Error + Send + Sync>
            + Send
            + Sync
            + 'static,
    {
        self.error_transformer = Arc::new(transformer);
        self
    }

    /// Applies the changes now instead of at drop time.
    pub fn commit(mut self) {
        self.apply();
    }

    fn apply(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;
        let config = Config::default()
            .with_allow_diff(self.allow_diff)
            .with_equality(self.equality)
            .with_mappers(self.mappers.freeze())
            .with_error_transformer(self.error_transformer.clone());
        self.owner.apply(config);
        tracing::debug!(
            allow_diff = self.allow_diff,
            equality = ?self.equality,
            "validator configuration updated"
        );
    }
}

impl Drop for ConfigUpdater<'_> {
    fn drop(&mut self) {
        self.apply();
    }
}

impl std::fmt::Debug for ConfigUpdater<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigUpdater")
            .field("allow_diff", &self.allow_diff)
            .field("equality", &self.equality)
            .field("mappers", &self.mappers)
            .field("committed", &self.committed)
            .finish()
    }
}
