//! Per-call binding context
//!
//! A [`Context`] carries everything that may change between two bind or serialize
//! calls: naming strategy, validation toggle, cast mode, serialization filter, value
//! pipeline and custom data. It is an immutable value; every `with_*` method returns
//! a modified copy and leaves the original untouched.
//!
//! ```rust,ignore
//! let base = Context::default();
//! let api = base.with_naming(CamelCaseNaming).with_cast_mode(CastMode::Permissive);
//! assert_eq!(base.cast_mode(), CastMode::Loose);
//! ```

mod config;
mod filter;
mod naming;
mod pipeline;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use config::{ConfigError, ContextConfig};
pub use filter::{DEFAULT_MAX_DEPTH, SerializationFilter};
pub use naming::{
    CamelCaseNaming, Direction, IdentityNaming, NamingConvention, NamingStrategy,
    SnakeCaseNaming, to_camel_case, to_snake_case,
};
pub use pipeline::{EmptyStringAsNull, TrimStrings, ValuePipe};

/// ISO 8601 with offset, e.g. `2024-03-01T09:30:00+00:00`
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// How hard casters try to coerce input values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastMode {
    /// Best-effort coercion between compatible representations
    #[default]
    Loose,
    /// Only values already of the declared JSON kind are accepted
    Strict,
    /// Loose, but a failed cast on a nullable field yields null
    Permissive,
}

/// Immutable per-call options for binding and serialization
#[derive(Debug, Clone)]
pub struct Context {
    naming: Arc<dyn NamingStrategy>,
    validation_enabled: bool,
    filter: SerializationFilter,
    cast_mode: CastMode,
    custom_data: Map<String, Value>,
    pipeline: Vec<Arc<dyn ValuePipe>>,
    datetime_format: String,
    date_format: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            naming: Arc::new(IdentityNaming),
            validation_enabled: true,
            filter: SerializationFilter::default(),
            cast_mode: CastMode::default(),
            custom_data: Map::new(),
            pipeline: Vec::new(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from configuration
    pub fn from_config(config: &ContextConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            naming: config.naming.strategy(),
            validation_enabled: config.validation,
            filter: config.filter.clone(),
            cast_mode: config.cast_mode,
            custom_data: config.custom_data.clone(),
            pipeline: config.resolve_pipes()?,
            datetime_format: config.datetime_format.clone(),
            date_format: config.date_format.clone(),
        })
    }

    pub fn naming(&self) -> &dyn NamingStrategy {
        self.naming.as_ref()
    }

    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }

    pub fn filter(&self) -> &SerializationFilter {
        &self.filter
    }

    pub fn cast_mode(&self) -> CastMode {
        self.cast_mode
    }

    pub fn is_strict(&self) -> bool {
        self.cast_mode == CastMode::Strict
    }

    pub fn custom_data(&self) -> &Map<String, Value> {
        &self.custom_data
    }

    pub fn custom(&self, key: &str) -> Option<&Value> {
        self.custom_data.get(key)
    }

    pub fn pipeline(&self) -> &[Arc<dyn ValuePipe>] {
        &self.pipeline
    }

    pub fn datetime_format(&self) -> &str {
        &self.datetime_format
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn with_naming(&self, naming: impl NamingStrategy + 'static) -> Self {
        self.with_naming_arc(Arc::new(naming))
    }

    pub fn with_naming_arc(&self, naming: Arc<dyn NamingStrategy>) -> Self {
        Self {
            naming,
            ..self.clone()
        }
    }

    pub fn with_validation(&self, enabled: bool) -> Self {
        Self {
            validation_enabled: enabled,
            ..self.clone()
        }
    }

    pub fn with_cast_mode(&self, cast_mode: CastMode) -> Self {
        Self {
            cast_mode,
            ..self.clone()
        }
    }

    pub fn with_filter(&self, filter: SerializationFilter) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }

    /// Filter scoped to the nested object under `field`
    pub fn scoped(&self, field: &str) -> Self {
        self.with_filter(self.filter.scoped(field))
    }

    pub fn with_include<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = self.filter.clone();
        filter.include = fields.into_iter().map(Into::into).collect();
        self.with_filter(filter)
    }

    pub fn with_exclude<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = self.filter.clone();
        filter.exclude = fields.into_iter().map(Into::into).collect();
        self.with_filter(filter)
    }

    pub fn with_max_depth(&self, max_depth: usize) -> Self {
        let mut filter = self.filter.clone();
        filter.max_depth = max_depth;
        self.with_filter(filter)
    }

    pub fn with_lazy<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = self.filter.clone();
        filter.lazy = fields.into_iter().map(Into::into).collect();
        self.with_filter(filter)
    }

    pub fn with_wrap(&self, key: impl Into<String>) -> Self {
        let mut filter = self.filter.clone();
        filter.wrap = Some(key.into());
        self.with_filter(filter)
    }

    pub fn with_custom_data(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut custom_data = self.custom_data.clone();
        custom_data.insert(key.into(), value.into());
        Self {
            custom_data,
            ..self.clone()
        }
    }

    /// Append a pipe to the value pipeline
    pub fn with_pipe(&self, pipe: impl ValuePipe + 'static) -> Self {
        let mut pipeline = self.pipeline.clone();
        pipeline.push(Arc::new(pipe));
        Self {
            pipeline,
            ..self.clone()
        }
    }

    pub fn with_datetime_format(&self, format: impl Into<String>) -> Self {
        Self {
            datetime_format: format.into(),
            ..self.clone()
        }
    }

    pub fn with_date_format(&self, format: impl Into<String>) -> Self {
        Self {
            date_format: format.into(),
            ..self.clone()
        }
    }
}
