//! Data Binding SDK - declarative, type-directed data binding
//!
//! Provides:
//! - Class metadata built once per type and cached (in memory or on disk)
//! - Hydration of loosely-typed input (maps, JSON/YAML documents, object snapshots)
//!   into typed instances, with loose, strict and permissive casting
//! - Rule validation that reports every violation of every field at once
//! - Normalization of instances back to ordered maps or JSON, with naming
//!   strategies, field filters, depth limits and computed fields
//!
//! ## Example
//!
//! ```rust,ignore
//! use data_binding_sdk::{Binder, Context, CamelCaseNaming};
//!
//! let binder = Binder::new();
//! let ctx = Context::default().with_naming(CamelCaseNaming);
//!
//! let user: User = binder.bind(r#"{"name": "Ada", "createdAt": "2024-03-01T09:30:00Z"}"#, &ctx)?;
//! let out = binder.to_json(&user, &ctx)?;
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod binder;
pub mod context;
pub mod hydration;
pub mod metadata;
pub mod model;
pub mod normalization;
pub mod registry;
pub mod validation;

pub use binder::{BindError, Binder, BinderBuilder};
pub use context::{
    CamelCaseNaming, CastMode, Context, ContextConfig, Direction, IdentityNaming,
    NamingStrategy, SerializationFilter, SnakeCaseNaming,
};
pub use hydration::{CastError, FieldError, FieldFailure, HydrationError, Input, MappingError};
pub use metadata::{ClassMeta, EnumMeta, FieldMeta, MetadataFactory, TypeDescriptor, TypeKind};
pub use model::{
    Arguments, Bindable, BindableEnum, ComputedFields, ConstructError, EnumValue, Structured,
    Typed,
};
pub use normalization::NormalizeError;
pub use registry::{Registry, Strategy};
pub use validation::{Rule, RuleViolation, ValidationError};

use serde_json::{Map, Value};

/// Bind `input` to a new `T` with a default [`Binder`]
pub fn bind<T: Bindable>(input: impl Into<Input>, ctx: &Context) -> Result<T, BindError> {
    Binder::new().bind(input, ctx)
}

/// Normalize `instance` with a default [`Binder`]
pub fn serialize(
    instance: &dyn Structured,
    ctx: &Context,
) -> Result<Map<String, Value>, BindError> {
    Ok(Binder::new().serialize(instance, ctx)?)
}
