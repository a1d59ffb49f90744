//! Priority-ordered strategy registries
//!
//! Casters, transformers, rule validators and input adapters are all looked up the
//! same way: strategies are registered with a priority, and a lookup walks them from
//! the highest priority down, returning the first one whose predicate accepts the
//! request. Strategies registered at the same priority keep their registration order.
//!
//! The sorted view is computed on the first lookup after a registration and reused
//! until the next registration.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

/// A named strategy that can live in a [`Registry`].
///
/// The name is used to resolve explicit per-field overrides (for example a field that
/// declares `cast_with("money")`).
pub trait Strategy: Send + Sync {
    /// Stable name of this strategy
    fn name(&self) -> &str;
}

/// Default priority for built-in strategies
pub const DEFAULT_PRIORITY: i32 = 0;

struct Entry<S: ?Sized> {
    strategy: Arc<S>,
    priority: i32,
}

/// Priority-ordered set of strategies
pub struct Registry<S: ?Sized> {
    entries: Vec<Entry<S>>,
    sorted: OnceCell<Vec<Arc<S>>>,
}

impl<S: ?Sized + Strategy> Registry<S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            sorted: OnceCell::new(),
        }
    }

    /// Register a strategy at the given priority (higher wins)
    pub fn register(&mut self, strategy: Arc<S>, priority: i32) -> &mut Self {
        self.entries.push(Entry { strategy, priority });
        self.sorted = OnceCell::new();
        self
    }

    /// Number of registered strategies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Strategies in dispatch order
    pub fn ordered(&self) -> &[Arc<S>] {
        self.sorted.get_or_init(|| {
            let mut indexed: Vec<(usize, i32)> = self
                .entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| (idx, entry.priority))
                .collect();
            // stable: equal priorities keep registration order
            indexed.sort_by(|a, b| b.1.cmp(&a.1));
            indexed
                .into_iter()
                .map(|(idx, _)| Arc::clone(&self.entries[idx].strategy))
                .collect()
        })
    }

    /// First strategy (in priority order) accepted by `accepts`
    pub fn find(&self, mut accepts: impl FnMut(&S) -> bool) -> Option<&Arc<S>> {
        self.ordered().iter().find(|strategy| accepts(strategy.as_ref()))
    }

    /// Highest-priority strategy registered under `name`
    pub fn by_name(&self, name: &str) -> Option<&Arc<S>> {
        self.find(|strategy| strategy.name() == name)
    }

    /// Names in dispatch order
    pub fn names(&self) -> Vec<String> {
        self.ordered()
            .iter()
            .map(|strategy| strategy.name().to_string())
            .collect()
    }
}

impl<S: ?Sized + Strategy> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + Strategy> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|entry| Entry {
                    strategy: Arc::clone(&entry.strategy),
                    priority: entry.priority,
                })
                .collect(),
            sorted: OnceCell::new(),
        }
    }
}

impl<S: ?Sized + Strategy> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (entry.strategy.name().to_string(), entry.priority)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Probe: Strategy {
        fn accepts(&self, value: i32) -> bool;
    }

    struct Named {
        name: &'static str,
        threshold: i32,
    }

    impl Strategy for Named {
        fn name(&self) -> &str {
            self.name
        }
    }

    impl Probe for Named {
        fn accepts(&self, value: i32) -> bool {
            value >= self.threshold
        }
    }

    fn named(name: &'static str, threshold: i32) -> Arc<dyn Probe> {
        Arc::new(Named { name, threshold })
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_order() {
        let mut a: Registry<dyn Probe> = Registry::new();
        a.register(named("low", 0), 10).register(named("high", 0), 20);

        let mut b: Registry<dyn Probe> = Registry::new();
        b.register(named("high", 0), 20).register(named("low", 0), 10);

        assert_eq!(a.find(|p| p.accepts(1)).unwrap().name(), "high");
        assert_eq!(b.find(|p| p.accepts(1)).unwrap().name(), "high");
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut registry: Registry<dyn Probe> = Registry::new();
        registry
            .register(named("first", 0), 5)
            .register(named("second", 0), 5)
            .register(named("third", 0), 5);

        assert_eq!(registry.names(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_registration_invalidates_sorted_view() {
        let mut registry: Registry<dyn Probe> = Registry::new();
        registry.register(named("a", 0), 1);
        assert_eq!(registry.names(), vec!["a"]);

        registry.register(named("b", 0), 2);
        assert_eq!(registry.names(), vec!["b", "a"]);
    }

    #[test]
    fn test_find_skips_non_matching() {
        let mut registry: Registry<dyn Probe> = Registry::new();
        registry
            .register(named("picky", 100), 50)
            .register(named("lenient", 0), 0);

        assert_eq!(registry.find(|p| p.accepts(5)).unwrap().name(), "lenient");
        assert_eq!(registry.find(|p| p.accepts(500)).unwrap().name(), "picky");
        assert!(registry.by_name("missing").is_none());
    }
}
