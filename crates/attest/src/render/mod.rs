//! Value representation and type-driven rendering.
//!
//! [`value`] defines the uniform subject model; [`mappers`] maps type tokens
//! to rendering functions and walks composites cycle-safely.

pub mod mappers;
pub mod value;

pub use mappers::{CYCLE_MARKER, MapperFn, MutableTypeMappers, RenderScope, Token, TypeMappers};
pub use value::{
    ErrorChain, IntoValue, ListHandle, MapHandle, OpaqueValue, SetHandle, TypeTag, Value,
    ValueKind,
};
