//! Bindable model contract
//!
//! User types implement [`Bindable`] (and [`BindableEnum`] for enums). The engine
//! talks to them only through [`Typed`] values: casters produce them, `construct`
//! consumes them through [`Arguments`], and `field_value` hands them back for
//! normalization.

mod bindable;
mod computed;
mod error;
mod typed;

pub use bindable::{Arguments, Bindable, BindableEnum, Structured, TypeRegistration};
pub use computed::{Computed, ComputedFields};
pub use error::ConstructError;
pub use typed::{EnumValue, FromTyped, Typed};
