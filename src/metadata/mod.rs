//! Class metadata: type descriptors, field and class descriptions, caching
//!
//! A bindable type describes itself once through [`Bindable::describe`]. The
//! [`MetadataFactory`] checks that description, registers any nested types it
//! references and keeps the result in a [`MetadataCache`], so every later lookup for
//! the same type returns the same `Arc<ClassMeta>`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use data_binding_sdk::metadata::{ClassMeta, FieldMeta, MetadataFactory, TypeDescriptor};
//!
//! let factory = MetadataFactory::new();
//! let first = factory.get::<User>()?;
//! let second = factory.get::<User>()?;
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! ```
//!
//! [`Bindable::describe`]: crate::model::Bindable::describe

mod cache;
mod class;
mod error;
mod factory;
mod field;
#[cfg(feature = "persistent-cache")]
mod persistent;
mod types;

pub use cache::{InMemoryCache, MetadataCache};
pub use class::{ClassMeta, ClassMetaBuilder};
pub use error::MetadataError;
pub use factory::MetadataFactory;
pub use field::{Annotation, FieldMeta};
#[cfg(feature = "persistent-cache")]
pub use persistent::PersistentCache;
pub use types::{EnumCase, EnumMeta, TypeDescriptor, TypeKind};
