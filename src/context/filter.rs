//! Serialization filter: which fields reach the output

use serde::{Deserialize, Serialize};

/// Default bound on nested object recursion during normalization
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Include/exclude lists, recursion bound, lazy field selection and output wrapping.
///
/// Include, exclude and lazy entries may be dotted paths (`address.city`), which apply
/// to the nested object under the first segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SerializationFilter {
    /// When non-empty, only these fields are emitted
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_depth: usize,
    /// Lazy computed fields to evaluate
    pub lazy: Vec<String>,
    /// Wrap the top-level output under this key
    pub wrap: Option<String>,
}

impl Default for SerializationFilter {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            lazy: Vec::new(),
            wrap: None,
        }
    }
}

fn head(path: &str) -> &str {
    path.split_once('.').map_or(path, |(head, _)| head)
}

fn scoped_paths(paths: &[String], field: &str) -> Vec<String> {
    paths
        .iter()
        .filter_map(|path| path.split_once('.'))
        .filter(|(head, _)| *head == field)
        .map(|(_, rest)| rest.to_string())
        .collect()
}

impl SerializationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a field at this level is emitted
    pub fn allows(&self, field: &str) -> bool {
        if self.exclude.iter().any(|path| path == field) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|path| head(path) == field)
    }

    /// Whether a lazy computed field at this level was requested
    pub fn wants_lazy(&self, field: &str) -> bool {
        self.lazy.iter().any(|path| path == field) && self.allows(field)
    }

    /// Filter applied inside the nested object stored under `field`.
    ///
    /// Naming the field itself in `include` selects the whole nested object; naming
    /// only some of its paths narrows it. The wrap key only applies at the top level.
    pub fn scoped(&self, field: &str) -> SerializationFilter {
        let include = if self.include.iter().any(|path| path == field) {
            Vec::new()
        } else {
            scoped_paths(&self.include, field)
        };

        SerializationFilter {
            include,
            exclude: scoped_paths(&self.exclude, field),
            max_depth: self.max_depth,
            lazy: scoped_paths(&self.lazy, field),
            wrap: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_allows_everything() {
        let filter = SerializationFilter::default();
        assert!(filter.allows("anything"));
        assert_eq!(filter.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!filter.wants_lazy("report"));
    }

    #[test]
    fn test_include_and_exclude() {
        let filter = SerializationFilter {
            include: paths(&["id", "address.city"]),
            exclude: paths(&["id"]),
            ..Default::default()
        };
        assert!(!filter.allows("id"));
        assert!(filter.allows("address"));
        assert!(!filter.allows("name"));
    }

    #[test]
    fn test_scoped_narrows_nested_paths() {
        let filter = SerializationFilter {
            include: paths(&["address.city", "name"]),
            exclude: paths(&["address.zip"]),
            lazy: paths(&["address.geo", "summary"]),
            wrap: Some("data".to_string()),
            ..Default::default()
        };
        let nested = filter.scoped("address");
        assert_eq!(nested.include, paths(&["city"]));
        assert_eq!(nested.exclude, paths(&["zip"]));
        assert_eq!(nested.lazy, paths(&["geo"]));
        assert!(nested.wrap.is_none());
    }

    #[test]
    fn test_including_parent_selects_whole_object() {
        let filter = SerializationFilter {
            include: paths(&["address", "address.city"]),
            ..Default::default()
        };
        assert!(filter.scoped("address").include.is_empty());
    }
}
