//! Insertion-ordered set of include paths.
//!
//! Two independent registries are kept per run: one for system includes
//! (emitted once, hoisted above the merged body) and one for local includes
//! (used only to avoid expanding the same spelling twice).

use std::collections::HashMap;

/// An ordered list of distinct path strings with O(1) membership.
///
/// Registering a path that is already present is a no-op that returns the
/// index it was first given. [`items`](Self::items) is always in first-seen
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncludeRegistry {
    items: Vec<String>,
    index: HashMap<String, usize>,
}

impl IncludeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`, returning its insertion index.
    pub fn register(&mut self, path: &str) -> usize {
        if let Some(&idx) = self.index.get(path) {
            return idx;
        }
        let idx = self.items.len();
        self.index.insert(path.to_owned(), idx);
        self.items.push(path.to_owned());
        idx
    }

    /// Whether `path` has been registered.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Insertion index of `path`, if registered.
    #[must_use]
    pub fn find_index(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }

    /// Registered paths in first-seen order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forget every registered path.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_returns_first_index() {
        let mut reg = IncludeRegistry::new();
        assert_eq!(reg.register("a"), 0);
        assert_eq!(reg.register("b"), 1);
        assert_eq!(reg.items(), ["a", "b"]);
        assert_eq!(reg.register("a"), 0);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn lookup_on_empty_registry() {
        let reg = IncludeRegistry::new();
        assert!(reg.is_empty());
        assert!(!reg.contains("a"));
        assert_eq!(reg.find_index("a"), None);
    }

    #[test]
    fn clear_resets_indices() {
        let mut reg = IncludeRegistry::new();
        reg.register("x");
        reg.register("y");
        reg.clear();
        assert!(reg.is_empty());
        assert!(!reg.contains("x"));
        assert_eq!(reg.register("y"), 0);
    }

    #[test]
    fn spelling_is_the_key() {
        let mut reg = IncludeRegistry::new();
        reg.register("a/b.hpp");
        assert!(!reg.contains("./a/b.hpp"));
        assert_eq!(reg.register("./a/b.hpp"), 1);
    }
}
