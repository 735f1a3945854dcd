//! Prelude module for convenient imports.
//!
//! A single `use attest::prelude::*;` brings in the factory, the fluent
//! validator, the value model, and the failure types.
//!
//! # Examples
//!
//! ```rust,ignore
//! use attest::prelude::*;
//!
//! let validators = Validators::new();
//! validators.require_that(age, "age").is_between(18, 100).into_result()?;
//! ```

pub use crate::config::{Config, EqualityMethod, ErrorTransformer};
pub use crate::diff::{DiffLines, DiffResult, DiffSegment, EOS_MARKER, SegmentKind, diff};
pub use crate::factory::{ConfigUpdater, Validators};
pub use crate::foundation::{Failure, FailureKind, Failures, ValidationError};
pub use crate::render::{
    IntoValue, MutableTypeMappers, RenderScope, Token, TypeMappers, TypeTag, Value, ValueKind,
};
pub use crate::validator::Validator;
