//! Core failure types and the shared chain state.

pub mod failure;
pub(crate) mod state;

pub use failure::{Failure, FailureKind, Failures, ValidationError};
