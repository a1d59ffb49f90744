//! Hydration: loosely-typed input to typed instances
//!
//! An [`Input`] is first turned into a map by the first accepting [`InputAdapter`].
//! The [`Hydrator`] then walks the type's fields in construction order: the
//! [`Mapper`] finds each field's input key, value pipes and rule validation run on the
//! raw value, and a [`Caster`] produces the typed value. Nested objects and typed
//! lists recurse. Failures of all fields are collected into one [`HydrationError`].

mod casters;
mod error;
mod hydrator;
mod input;
mod mapper;

pub use casters::{
    BoolCaster, Caster, CasterRegistry, DateTimeCaster, EnumCaster, FloatCaster, IntCaster,
    StringCaster, UuidCaster,
};
pub use error::{CastError, FieldError, FieldFailure, HydrationError, InputError, MappingError};
pub use hydrator::Hydrator;
#[cfg(feature = "yaml")]
pub use input::YamlDocumentAdapter;
pub use input::{
    Input, InputAdapter, InputAdapters, JsonDocumentAdapter, MapAdapter, SnapshotAdapter,
};
pub use mapper::{Mapped, Mapper};
