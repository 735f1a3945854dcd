//! # attest
//!
//! A fluent validation toolkit: describe constraints on a named value and
//! get back structured failures with human-readable, diff-annotated
//! messages.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use attest::prelude::*;
//!
//! let validators = Validators::new();
//!
//! // Eager: the first failure is the one you get back.
//! validators.require_that(name, "name").is_not_empty().into_result()?;
//!
//! // Collecting: gather every failure, then decide.
//! let failures = validators
//!     .check_if(request.retries, "retries")
//!     .is_greater_than_or_equal_to(0)
//!     .is_less_than(10)
//!     .failures();
//! ```
//!
//! ## Design
//!
//! - Each chain owns an immutable configuration snapshot; updates through
//!   [`Validators::update_configuration`](factory::Validators::update_configuration)
//!   apply only to chains opened afterwards.
//! - A null subject (or a kind mismatch) trips the chain's fatal flag:
//!   later checks become no-ops instead of piling up misleading secondary
//!   failures.
//! - Values render through a type-token registry with cycle-safe composite
//!   walking; equality failures embed a character diff of the renderings.

pub mod config;
pub mod diff;
pub mod factory;
pub mod foundation;
pub mod render;
pub mod validator;

mod message;
pub mod prelude;

pub use config::{Config, EqualityMethod, ErrorTransformer};
pub use factory::{ConfigUpdater, Validators};
pub use foundation::{Failure, FailureKind, Failures, ValidationError};
pub use render::{IntoValue, MutableTypeMappers, TypeMappers, TypeTag, Value, ValueKind};
pub use validator::Validator;
