//! Normalization: typed instances to loosely-typed output
//!
//! The [`Normalizer`] is the inverse of the hydrator. It reads each visible field from
//! the instance, renders leaf values with the first matching [`Transformer`] (or the
//! field's explicit override), recurses into nested instances and lists, and appends
//! the instance's computed fields. The serialization filter of the
//! [`Context`](crate::context::Context) controls which fields appear, how deep nested
//! objects are expanded, which lazy computed fields are evaluated and whether the
//! output is wrapped under a key.

mod error;
mod normalizer;
mod transformers;

pub use error::NormalizeError;
pub use normalizer::{Normalizer, output_key};
pub use transformers::{
    DateTimeTransformer, EnumTransformer, ScalarTransformer, Transformer, TransformerRegistry,
};
