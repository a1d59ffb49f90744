//! Serializable configuration for building a [`Context`](super::Context)

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::filter::SerializationFilter;
use super::naming::NamingConvention;
use super::pipeline::{EmptyStringAsNull, TrimStrings, ValuePipe};
use super::{CastMode, DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT};

/// Errors from loading a context configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "yaml")]
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown value pipe: {0}")]
    UnknownPipe(String),
}

/// Context settings as they appear in a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    #[serde(default)]
    pub naming: NamingConvention,

    #[serde(default = "default_true")]
    pub validation: bool,

    #[serde(default)]
    pub cast_mode: CastMode,

    #[serde(default)]
    pub filter: SerializationFilter,

    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Built-in value pipes by name, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipes: Vec<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_data: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

fn default_datetime_format() -> String {
    DEFAULT_DATETIME_FORMAT.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            naming: NamingConvention::default(),
            validation: default_true(),
            cast_mode: CastMode::default(),
            filter: SerializationFilter::default(),
            datetime_format: default_datetime_format(),
            date_format: default_date_format(),
            pipes: Vec::new(),
            custom_data: Map::new(),
        }
    }
}

impl ContextConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    pub fn with_cast_mode(mut self, mode: CastMode) -> Self {
        self.cast_mode = mode;
        self
    }

    pub fn with_filter(mut self, filter: SerializationFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_pipe(mut self, name: impl Into<String>) -> Self {
        self.pipes.push(name.into());
        self
    }

    pub fn with_custom_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_data.insert(key.into(), value.into());
        self
    }

    /// Resolve the configured pipe names to built-in pipes
    pub(crate) fn resolve_pipes(&self) -> Result<Vec<Arc<dyn ValuePipe>>, ConfigError> {
        self.pipes
            .iter()
            .map(|name| match name.as_str() {
                "trim_strings" => Ok(Arc::new(TrimStrings) as Arc<dyn ValuePipe>),
                "empty_string_as_null" => Ok(Arc::new(EmptyStringAsNull) as Arc<dyn ValuePipe>),
                other => Err(ConfigError::UnknownPipe(other.to_string())),
            })
            .collect()
    }
}
