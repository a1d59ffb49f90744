//! Computed (derived) output fields

use std::fmt;

use super::typed::Typed;

/// One computed output value
pub enum Computed {
    /// Always-present value
    Value(Typed),
    /// Evaluated only when the serialization filter asks for it
    Lazy(Box<dyn FnOnce() -> Typed + Send>),
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Computed::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Computed::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Ordered name → computed value map supplied by an instance
#[derive(Debug, Default)]
pub struct ComputedFields {
    entries: Vec<(String, Computed)>,
}

impl ComputedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an eagerly computed value
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Typed>) -> Self {
        self.entries
            .push((name.into(), Computed::Value(value.into())));
        self
    }

    /// Add a lazily computed value
    pub fn lazy<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: FnOnce() -> Typed + Send + 'static,
    {
        self.entries
            .push((name.into(), Computed::Lazy(Box::new(compute))));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl IntoIterator for ComputedFields {
    type Item = (String, Computed);
    type IntoIter = std::vec::IntoIter<(String, Computed)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_is_not_evaluated_on_construction() {
        let fields = ComputedFields::new()
            .value("initials", "AB")
            .lazy("report", || panic!("must not run"));
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["initials", "report"]);
        assert_eq!(fields.len(), 2);
    }
}
