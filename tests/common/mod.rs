//! Shared bindable fixtures for the integration tests

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use data_binding_sdk::metadata::{ClassMeta, EnumMeta, FieldMeta, TypeDescriptor};
use data_binding_sdk::model::{
    Arguments, Bindable, BindableEnum, ComputedFields, ConstructError, Typed,
};
use data_binding_sdk::validation::Rule;

pub const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Active,
    Suspended,
}

impl BindableEnum for Status {
    fn enum_meta() -> EnumMeta {
        EnumMeta::new("Status").case("Active").case("Suspended")
    }

    fn from_case(case: &str) -> Option<Self> {
        match case {
            "Active" => Some(Status::Active),
            "Suspended" => Some(Status::Suspended),
            _ => None,
        }
    }

    fn case_name(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Suspended => "Suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Priority {
    Low,
    High,
}

impl BindableEnum for Priority {
    fn enum_meta() -> EnumMeta {
        EnumMeta::new("Priority")
            .backed_case("Low", 1)
            .backed_case("High", 10)
    }

    fn from_case(case: &str) -> Option<Self> {
        match case {
            "Low" => Some(Priority::Low),
            "High" => Some(Priority::High),
            _ => None,
        }
    }

    fn case_name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<String>,
}

impl Bindable for Address {
    const TYPE_ID: &'static str = "Address";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(FieldMeta::new("street", TypeDescriptor::string()))
            .field(
                FieldMeta::new("city", TypeDescriptor::string()).rule(Rule::length(Some(2), None)),
            )
            .field(
                FieldMeta::new("zip", TypeDescriptor::string().nullable())
                    .rule(Rule::pattern(r"^\d{5}$")),
            )
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            street: args.take("street")?,
            city: args.take("city")?,
            zip: args.take("zip")?,
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "street" => Some(self.street.clone().into()),
            "city" => Some(self.city.clone().into()),
            "zip" => Some(self.zip.clone().into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub active: bool,
    pub created_at: DateTime<FixedOffset>,
    pub status: Status,
    pub address: Address,
    pub tags: Vec<String>,
    pub password: Option<String>,
}

impl Bindable for User {
    const TYPE_ID: &'static str = "User";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(FieldMeta::new("id", TypeDescriptor::uuid()))
            .field(
                FieldMeta::new("name", TypeDescriptor::string())
                    .rule(Rule::length(Some(1), Some(100))),
            )
            .field(
                FieldMeta::new("email", TypeDescriptor::string())
                    .map_name("email_address")
                    .rule(Rule::Email),
            )
            .field(
                FieldMeta::new("age", TypeDescriptor::int().nullable())
                    .rule(Rule::between(0.0, 150.0)),
            )
            .field(FieldMeta::new("active", TypeDescriptor::bool()).with_default(true))
            .field(FieldMeta::new("created_at", TypeDescriptor::datetime()))
            .field(
                FieldMeta::new("status", TypeDescriptor::enumeration::<Status>())
                    .with_default("Active"),
            )
            .field(FieldMeta::new("address", TypeDescriptor::object::<Address>()))
            .field(
                FieldMeta::new("tags", TypeDescriptor::list(TypeDescriptor::string()))
                    .with_default(json!([])),
            )
            .field(FieldMeta::new("password", TypeDescriptor::string().nullable()).hidden())
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            id: args.take("id")?,
            name: args.take("name")?,
            email: args.take("email")?,
            age: args.take("age")?,
            active: args.take("active")?,
            created_at: args.take("created_at")?,
            status: args.take_enum("status")?,
            address: args.take_object("address")?,
            tags: args.take("tags")?,
            password: args.take("password")?,
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "age" => Some(self.age.into()),
            "active" => Some(self.active.into()),
            "created_at" => Some(self.created_at.into()),
            "status" => Some(Typed::enumeration(&self.status)),
            "address" => Some(Typed::object(&self.address)),
            "tags" => Some(self.tags.clone().into()),
            "password" => Some(self.password.clone().into()),
            _ => None,
        }
    }

    fn computed_fields(&self) -> ComputedFields {
        ComputedFields::new().value("display_name", format!("{} <{}>", self.name, self.email))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub title: String,
    pub priority: Priority,
    pub due: Option<NaiveDate>,
}

impl Bindable for Task {
    const TYPE_ID: &'static str = "Task";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(FieldMeta::new("title", TypeDescriptor::string()))
            .field(FieldMeta::new("priority", TypeDescriptor::enumeration::<Priority>()))
            .field(FieldMeta::new("due", TypeDescriptor::date().nullable()).format("%d.%m.%Y"))
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            title: args.take("title")?,
            priority: args.take_enum("priority")?,
            due: args.take("due")?,
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "title" => Some(self.title.clone().into()),
            "priority" => Some(Typed::enumeration(&self.priority)),
            "due" => Some(self.due.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub sku: String,
    pub qty: i64,
}

impl Bindable for Line {
    const TYPE_ID: &'static str = "Line";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(FieldMeta::new("sku", TypeDescriptor::string()))
            .field(FieldMeta::new("qty", TypeDescriptor::int()).rule(Rule::Min(1.0)))
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            sku: args.take("sku")?,
            qty: args.take("qty")?,
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "sku" => Some(self.sku.clone().into()),
            "qty" => Some(self.qty.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub reference: String,
    pub lines: Vec<Line>,
}

impl Bindable for Order {
    const TYPE_ID: &'static str = "Order";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(FieldMeta::new("reference", TypeDescriptor::string()))
            .field(FieldMeta::new("lines", TypeDescriptor::list(TypeDescriptor::object::<Line>())))
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            reference: args.take("reference")?,
            lines: args.take_objects("lines")?,
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "reference" => Some(self.reference.clone().into()),
            "lines" => Some(Typed::objects(&self.lines)),
            _ => None,
        }
    }
}

/// Self-referencing type for depth tests
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub child: Option<Box<Node>>,
}

impl Node {
    pub fn chain(depth: usize) -> Node {
        let mut node = Node {
            name: format!("n{}", depth),
            child: None,
        };
        for level in (0..depth).rev() {
            node = Node {
                name: format!("n{}", level),
                child: Some(Box::new(node)),
            };
        }
        node
    }
}

impl Bindable for Node {
    const TYPE_ID: &'static str = "Node";

    fn describe() -> ClassMeta {
        ClassMeta::builder(Self::TYPE_ID)
            .field(FieldMeta::new("name", TypeDescriptor::string()))
            .field(FieldMeta::new("child", TypeDescriptor::object::<Node>().nullable()))
            .build()
    }

    fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
        Ok(Self {
            name: args.take("name")?,
            child: args.take_optional_object::<Node>("child")?.map(Box::new),
        })
    }

    fn field_value(&self, field: &str) -> Option<Typed> {
        match field {
            "name" => Some(self.name.clone().into()),
            "child" => Some(Typed::optional_object(self.child.as_deref())),
            _ => None,
        }
    }
}

pub fn user_input() -> Value {
    json!({
        "id": USER_ID,
        "name": "Ada Lovelace",
        "email_address": "ada@example.com",
        "age": "36",
        "created_at": "2024-03-01T09:30:00+00:00",
        "address": { "street": "12 St James's Square", "city": "London", "zip": "12345" },
        "tags": ["math", "engines"],
        "password": "secret"
    })
}

pub fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}
