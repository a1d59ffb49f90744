//! Input adapters: turn whatever the caller has into a key/value map

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::InputError;
use crate::registry::{DEFAULT_PRIORITY, Registry, Strategy};

/// Raw input handed to the binder
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Already-decoded key/value map
    Map(Map<String, Value>),
    /// Serialized document text (JSON, or YAML with the `yaml` feature)
    Document(String),
    /// Snapshot of a foreign object's public fields
    Object(Value),
}

impl Input {
    /// Snapshot the serializable fields of any value
    pub fn snapshot<T: Serialize + ?Sized>(value: &T) -> Result<Self, InputError> {
        Ok(Input::Object(serde_json::to_value(value)?))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Input::Map(_) => "map",
            Input::Document(_) => "document",
            Input::Object(_) => "object",
        }
    }
}

impl From<Map<String, Value>> for Input {
    fn from(map: Map<String, Value>) -> Self {
        Input::Map(map)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Input::Map(map),
            other => Input::Object(other),
        }
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Document(text)
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Document(text.to_string())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts one shape of [`Input`] into a map
pub trait InputAdapter: Strategy {
    fn supports(&self, input: &Input) -> bool;

    fn adapt(&self, input: Input) -> Result<Map<String, Value>, InputError>;
}

#[derive(Debug, Default)]
pub struct MapAdapter;

impl Strategy for MapAdapter {
    fn name(&self) -> &str {
        "map"
    }
}

impl InputAdapter for MapAdapter {
    fn supports(&self, input: &Input) -> bool {
        matches!(input, Input::Map(_))
    }

    fn adapt(&self, input: Input) -> Result<Map<String, Value>, InputError> {
        match input {
            Input::Map(map) => Ok(map),
            other => Err(InputError::Unsupported(other.kind())),
        }
    }
}

/// JSON text whose first non-blank character opens an object
#[derive(Debug, Default)]
pub struct JsonDocumentAdapter;

impl Strategy for JsonDocumentAdapter {
    fn name(&self) -> &str {
        "json"
    }
}

impl InputAdapter for JsonDocumentAdapter {
    fn supports(&self, input: &Input) -> bool {
        matches!(input, Input::Document(text) if text.trim_start().starts_with('{'))
    }

    fn adapt(&self, input: Input) -> Result<Map<String, Value>, InputError> {
        match input {
            Input::Document(text) => Ok(serde_json::from_str(&text)?),
            other => Err(InputError::Unsupported(other.kind())),
        }
    }
}

/// Any other document text, read as YAML
#[cfg(feature = "yaml")]
#[derive(Debug, Default)]
pub struct YamlDocumentAdapter;

#[cfg(feature = "yaml")]
impl Strategy for YamlDocumentAdapter {
    fn name(&self) -> &str {
        "yaml"
    }
}

#[cfg(feature = "yaml")]
impl InputAdapter for YamlDocumentAdapter {
    fn supports(&self, input: &Input) -> bool {
        matches!(input, Input::Document(_))
    }

    fn adapt(&self, input: Input) -> Result<Map<String, Value>, InputError> {
        match input {
            Input::Document(text) => match serde_yaml::from_str::<Value>(&text)? {
                Value::Object(map) => Ok(map),
                other => Err(InputError::NotAnObject(value_kind(&other))),
            },
            other => Err(InputError::Unsupported(other.kind())),
        }
    }
}

/// Field snapshot of a foreign object
#[derive(Debug, Default)]
pub struct SnapshotAdapter;

impl Strategy for SnapshotAdapter {
    fn name(&self) -> &str {
        "snapshot"
    }
}

impl InputAdapter for SnapshotAdapter {
    fn supports(&self, input: &Input) -> bool {
        matches!(input, Input::Object(_))
    }

    fn adapt(&self, input: Input) -> Result<Map<String, Value>, InputError> {
        match input {
            Input::Object(Value::Object(map)) => Ok(map),
            Input::Object(other) => Err(InputError::NotAnObject(value_kind(&other))),
            other => Err(InputError::Unsupported(other.kind())),
        }
    }
}

/// Priority-ordered input adapters; the first that accepts an input wins
#[derive(Debug, Clone)]
pub struct InputAdapters {
    adapters: Registry<dyn InputAdapter>,
}

impl InputAdapters {
    pub fn empty() -> Self {
        Self {
            adapters: Registry::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut adapters = Self::empty();
        adapters
            .register(Arc::new(MapAdapter), DEFAULT_PRIORITY)
            .register(Arc::new(JsonDocumentAdapter), DEFAULT_PRIORITY)
            .register(Arc::new(SnapshotAdapter), DEFAULT_PRIORITY);
        #[cfg(feature = "yaml")]
        adapters.register(Arc::new(YamlDocumentAdapter), DEFAULT_PRIORITY - 10);
        adapters
    }

    pub fn register(&mut self, adapter: Arc<dyn InputAdapter>, priority: i32) -> &mut Self {
        self.adapters.register(adapter, priority);
        self
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Convert `input` with the first adapter that accepts it
    pub fn adapt(&self, input: Input) -> Result<Map<String, Value>, InputError> {
        match self.adapters.find(|adapter| adapter.supports(&input)) {
            Some(adapter) => adapter.adapt(input),
            None => Err(InputError::Unsupported(input.kind())),
        }
    }
}

impl Default for InputAdapters {
    fn default() -> Self {
        Self::with_builtins()
    }
}
