//! The contract between the binding engine and user types

use std::any::Any;
use std::fmt;

use super::computed::ComputedFields;
use super::error::ConstructError;
use super::typed::{FromTyped, Typed};
use crate::metadata::{ClassMeta, EnumMeta};

/// A type that can be hydrated from loose input and normalized back.
///
/// `describe` replaces runtime reflection: it is called once per type by the
/// [`MetadataFactory`](crate::metadata::MetadataFactory) and the result is cached.
///
/// ```rust,ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Address {
///     street: String,
///     city: String,
/// }
///
/// impl Bindable for Address {
///     const TYPE_ID: &'static str = "Address";
///
///     fn describe() -> ClassMeta {
///         ClassMeta::builder(Self::TYPE_ID)
///             .field(FieldMeta::new("street", TypeDescriptor::string()))
///             .field(FieldMeta::new("city", TypeDescriptor::string()))
///             .build()
///     }
///
///     fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
///         Ok(Self {
///             street: args.take("street")?,
///             city: args.take("city")?,
///         })
///     }
///
///     fn field_value(&self, field: &str) -> Option<Typed> {
///         match field {
///             "street" => Some(self.street.clone().into()),
///             "city" => Some(self.city.clone().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Bindable: Clone + fmt::Debug + Send + Sync + 'static {
    /// Stable identifier used as the metadata cache key
    const TYPE_ID: &'static str;

    /// Declare the type's fields and policy
    fn describe() -> ClassMeta;

    /// Build an instance from typed arguments in construction order
    fn construct(args: &mut Arguments) -> Result<Self, ConstructError>;

    /// Current value of a declared field
    fn field_value(&self, field: &str) -> Option<Typed>;

    /// Derived output fields, merged after declared fields on normalization
    fn computed_fields(&self) -> ComputedFields {
        ComputedFields::new()
    }
}

/// An enum that binds to a declared set of cases
pub trait BindableEnum: Sized + 'static {
    /// Cases and (optional) backing values
    fn enum_meta() -> EnumMeta;

    /// Value for a case name
    fn from_case(case: &str) -> Option<Self>;

    /// Case name of this value
    fn case_name(&self) -> &'static str;
}

/// Object-safe view of a bound instance, used for nesting and normalization
pub trait Structured: Any + Send + Sync + fmt::Debug {
    /// Type id the instance was registered under
    fn bind_type(&self) -> &'static str;

    /// Registration of the instance's type
    fn registration(&self) -> TypeRegistration;

    /// Current value of a declared field
    fn read_field(&self, field: &str) -> Option<Typed>;

    /// Derived output fields
    fn derived_fields(&self) -> ComputedFields;

    fn clone_boxed(&self) -> Box<dyn Structured>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Bindable> Structured for T {
    fn bind_type(&self) -> &'static str {
        T::TYPE_ID
    }

    fn registration(&self) -> TypeRegistration {
        TypeRegistration::of::<T>()
    }

    fn read_field(&self, field: &str) -> Option<Typed> {
        self.field_value(field)
    }

    fn derived_fields(&self) -> ComputedFields {
        self.computed_fields()
    }

    fn clone_boxed(&self) -> Box<dyn Structured> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn Structured> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl dyn Structured {
    /// Convert a boxed instance into its concrete type
    pub fn downcast<T: Bindable>(self: Box<Self>) -> Option<T> {
        self.into_any().downcast::<T>().ok().map(|value| *value)
    }

    /// Borrow as a concrete type
    pub fn downcast_ref<T: Bindable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

fn construct_boxed<T: Bindable>(
    args: &mut Arguments,
) -> Result<Box<dyn Structured>, ConstructError> {
    T::construct(args).map(|value| Box::new(value) as Box<dyn Structured>)
}

/// How the engine describes and constructs one bindable type
#[derive(Clone, Copy)]
pub struct TypeRegistration {
    pub type_id: &'static str,
    pub describe: fn() -> ClassMeta,
    pub construct: fn(&mut Arguments) -> Result<Box<dyn Structured>, ConstructError>,
}

impl TypeRegistration {
    pub fn of<T: Bindable>() -> Self {
        Self {
            type_id: T::TYPE_ID,
            describe: T::describe,
            construct: construct_boxed::<T>,
        }
    }
}

impl PartialEq for TypeRegistration {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// Typed constructor arguments, in construction order
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    type_id: String,
    values: Vec<(String, Typed)>,
}

impl Arguments {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            values: Vec::new(),
        }
    }

    /// Type the arguments are collected for
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn push(&mut self, name: impl Into<String>, value: Typed) {
        self.values.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field names in the order they were resolved
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| n == name)
    }

    /// Remove and return the raw typed value of a field
    pub fn take_typed(&mut self, name: &str) -> Result<Typed, ConstructError> {
        let idx = self
            .values
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| ConstructError::MissingArgument {
                type_id: self.type_id.clone(),
                field: name.to_string(),
            })?;
        Ok(self.values.remove(idx).1)
    }

    fn mismatch(&self, name: &str, expected: &str, found: &Typed) -> ConstructError {
        ConstructError::TypeMismatch {
            type_id: self.type_id.clone(),
            field: name.to_string(),
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }

    /// Take a scalar, optional or list field
    pub fn take<T: FromTyped>(&mut self, name: &str) -> Result<T, ConstructError> {
        let value = self.take_typed(name)?;
        let found = value.kind_name();
        T::from_typed(value).ok_or_else(|| ConstructError::TypeMismatch {
            type_id: self.type_id.clone(),
            field: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: found.to_string(),
        })
    }

    /// Take a nested bindable field
    pub fn take_object<T: Bindable>(&mut self, name: &str) -> Result<T, ConstructError> {
        let value = self.take_typed(name)?;
        self.object_from(name, value)
    }

    /// Take a nullable nested bindable field
    pub fn take_optional_object<T: Bindable>(
        &mut self,
        name: &str,
    ) -> Result<Option<T>, ConstructError> {
        match self.take_typed(name)? {
            Typed::Null => Ok(None),
            value => self.object_from(name, value).map(Some),
        }
    }

    /// Take a list of nested bindable values
    pub fn take_objects<T: Bindable>(&mut self, name: &str) -> Result<Vec<T>, ConstructError> {
        match self.take_typed(name)? {
            Typed::List(items) => items
                .into_iter()
                .map(|item| self.object_from(name, item))
                .collect(),
            other => Err(self.mismatch(name, "list", &other)),
        }
    }

    /// Take an enum field
    pub fn take_enum<E: BindableEnum>(&mut self, name: &str) -> Result<E, ConstructError> {
        let value = self.take_typed(name)?;
        self.enum_from(name, value)
    }

    /// Take a nullable enum field
    pub fn take_optional_enum<E: BindableEnum>(
        &mut self,
        name: &str,
    ) -> Result<Option<E>, ConstructError> {
        match self.take_typed(name)? {
            Typed::Null => Ok(None),
            value => self.enum_from(name, value).map(Some),
        }
    }

    /// Take a list of enum values
    pub fn take_enums<E: BindableEnum>(&mut self, name: &str) -> Result<Vec<E>, ConstructError> {
        match self.take_typed(name)? {
            Typed::List(items) => items
                .into_iter()
                .map(|item| self.enum_from(name, item))
                .collect(),
            other => Err(self.mismatch(name, "list", &other)),
        }
    }

    fn object_from<T: Bindable>(&self, name: &str, value: Typed) -> Result<T, ConstructError> {
        match value {
            Typed::Object(object) => {
                let found = object.bind_type();
                object.downcast::<T>().ok_or_else(|| ConstructError::TypeMismatch {
                    type_id: self.type_id.clone(),
                    field: name.to_string(),
                    expected: T::TYPE_ID.to_string(),
                    found: found.to_string(),
                })
            }
            other => Err(self.mismatch(name, T::TYPE_ID, &other)),
        }
    }

    fn enum_from<E: BindableEnum>(&self, name: &str, value: Typed) -> Result<E, ConstructError> {
        match value {
            Typed::Enum(enum_value) => {
                E::from_case(&enum_value.case).ok_or_else(|| ConstructError::Invalid {
                    type_id: self.type_id.clone(),
                    field: name.to_string(),
                    message: format!(
                        "'{}' is not a case of {}",
                        enum_value.case,
                        E::enum_meta().name
                    ),
                })
            }
            other => Err(self.mismatch(name, &E::enum_meta().name, &other)),
        }
    }
}
