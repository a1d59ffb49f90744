//! Type descriptors for bindable fields

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Bindable, BindableEnum, TypeRegistration};

/// Shape of a declared field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Bool,
    Int,
    Float,
    String,
    Uuid,
    /// Calendar date without time
    Date,
    /// Date-time with UTC offset
    DateTime,
    Enum,
    /// Nested bindable type
    Object,
    List,
    /// Untyped value, passed through unchanged
    Any,
}

impl TypeKind {
    /// Canonical name used in descriptors and messages
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::String => "string",
            TypeKind::Uuid => "uuid",
            TypeKind::Date => "date",
            TypeKind::DateTime => "datetime",
            TypeKind::Enum => "enum",
            TypeKind::Object => "object",
            TypeKind::List => "list",
            TypeKind::Any => "any",
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One case of an enum type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumCase {
    pub name: String,
    /// Backing value, if the enum is backed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Cases of an enum type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMeta {
    pub name: String,
    pub cases: Vec<EnumCase>,
}

impl EnumMeta {
    /// Create an enum description with no cases
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Add a case without a backing value
    pub fn case(mut self, name: impl Into<String>) -> Self {
        self.cases.push(EnumCase {
            name: name.into(),
            value: None,
        });
        self
    }

    /// Add a case with a backing value
    pub fn backed_case(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cases.push(EnumCase {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// An enum is backed when every case carries a value
    pub fn is_backed(&self) -> bool {
        !self.cases.is_empty() && self.cases.iter().all(|c| c.value.is_some())
    }

    /// Look up a case by exact name
    pub fn find_case(&self, name: &str) -> Option<&EnumCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Look up a case by backing value
    pub fn find_value(&self, value: &Value) -> Option<&EnumCase> {
        self.cases.iter().find(|c| c.value.as_ref() == Some(value))
    }
}

/// Recursive description of a field's declared type.
///
/// `registration` is only present for [`TypeKind::Object`] descriptors built in
/// process; it is not serialized, so descriptors loaded from a persistent cache
/// resolve nested types by name through the metadata factory. Equality ignores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Box<TypeDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_meta: Option<EnumMeta>,
    #[serde(skip)]
    pub registration: Option<TypeRegistration>,
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.nullable == other.nullable
            && self.item == other.item
            && self.enum_meta == other.enum_meta
    }
}

impl TypeDescriptor {
    fn of(kind: TypeKind) -> Self {
        Self {
            name: kind.type_name().to_string(),
            kind,
            nullable: false,
            item: None,
            enum_meta: None,
            registration: None,
        }
    }

    pub fn bool() -> Self {
        Self::of(TypeKind::Bool)
    }

    pub fn int() -> Self {
        Self::of(TypeKind::Int)
    }

    pub fn float() -> Self {
        Self::of(TypeKind::Float)
    }

    pub fn string() -> Self {
        Self::of(TypeKind::String)
    }

    pub fn uuid() -> Self {
        Self::of(TypeKind::Uuid)
    }

    pub fn date() -> Self {
        Self::of(TypeKind::Date)
    }

    pub fn datetime() -> Self {
        Self::of(TypeKind::DateTime)
    }

    pub fn any() -> Self {
        Self::of(TypeKind::Any)
    }

    /// Typed collection whose items follow `item`
    pub fn list(item: TypeDescriptor) -> Self {
        Self {
            name: format!("list<{}>", item.name),
            item: Some(Box::new(item)),
            ..Self::of(TypeKind::List)
        }
    }

    /// Collection with no declared item type
    pub fn untyped_list() -> Self {
        Self::of(TypeKind::List)
    }

    /// Enum field backed by a Rust enum
    pub fn enumeration<E: BindableEnum>() -> Self {
        Self::enum_of(E::enum_meta())
    }

    /// Enum field from an explicit description
    pub fn enum_of(meta: EnumMeta) -> Self {
        Self {
            name: meta.name.clone(),
            enum_meta: Some(meta),
            ..Self::of(TypeKind::Enum)
        }
    }

    /// Nested bindable type
    pub fn object<T: Bindable>() -> Self {
        Self {
            name: T::TYPE_ID.to_string(),
            registration: Some(TypeRegistration::of::<T>()),
            ..Self::of(TypeKind::Object)
        }
    }

    /// Nested type referenced by id only; it must be registered with the factory
    pub fn object_named(type_id: impl Into<String>) -> Self {
        Self {
            name: type_id.into(),
            ..Self::of(TypeKind::Object)
        }
    }

    /// Mark this type as accepting null
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Bool | TypeKind::Int | TypeKind::Float | TypeKind::String
        )
    }

    pub fn is_collection(&self) -> bool {
        self.kind == TypeKind::List
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_structured(&self) -> bool {
        self.kind == TypeKind::Object
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self.kind, TypeKind::Date | TypeKind::DateTime)
    }

    /// Item type of a typed collection
    pub fn item_type(&self) -> Option<&TypeDescriptor> {
        self.item.as_deref()
    }
}
