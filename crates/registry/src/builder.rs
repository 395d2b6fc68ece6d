//! Registration-time and frozen keyed registries.
//!
//! A registry is populated once during startup through a
//! [`RegistryBuilder`] and then frozen into an immutable [`Registry`] that
//! can be shared across threads without synchronization.

use std::collections::HashMap;
use std::sync::Arc;

use limlib_core::RegistryKey;
use tracing::{debug, info};

use crate::RegistryError;

/// Builder collecting keyed entries before the registry is frozen.
pub struct RegistryBuilder<T> {
    label: &'static str,
    entries: Vec<(RegistryKey, T)>,
    index: HashMap<RegistryKey, usize>,
}

impl<T> RegistryBuilder<T> {
    /// Creates an empty builder. `label` names the registry in errors and logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Adds an entry. Fails without modifying the builder if `key` is taken.
    pub fn register(&mut self, key: RegistryKey, value: T) -> Result<(), RegistryError> {
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateKey {
                registry: self.label,
                key,
            });
        }
        debug!(registry = self.label, %key, "registered entry");
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        Ok(())
    }

    /// Whether `key` has been registered.
    pub fn contains(&self, key: &RegistryKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of entries registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the builder into an immutable registry.
    pub fn freeze(self) -> Registry<T> {
        info!(
            registry = self.label,
            entries = self.entries.len(),
            "registry frozen"
        );
        Registry {
            label: self.label,
            entries: self.entries,
            index: self.index,
        }
    }
}

/// Immutable keyed registry. Iteration follows registration order.
pub struct Registry<T> {
    label: &'static str,
    entries: Vec<(RegistryKey, T)>,
    index: HashMap<RegistryKey, usize>,
}

impl<T> Registry<T> {
    fn empty(label: &'static str) -> Self {
        Self {
            label,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &RegistryKey) -> Option<&T> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    /// Look up an entry by its string form (`namespace:path` or bare path).
    pub fn get_str(&self, key: &str) -> Option<&T> {
        RegistryKey::parse(key).ok().and_then(|key| self.get(&key))
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &RegistryKey) -> bool {
        self.index.contains_key(key)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &RegistryKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&RegistryKey, &T)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

enum CellState<T> {
    Open(RegistryBuilder<T>),
    Frozen(Arc<Registry<T>>),
}

/// A registry with an explicit freeze point.
///
/// Open until [`RegistryCell::freeze`] is called; every later
/// [`RegistryCell::register`] fails with [`RegistryError::Frozen`].
pub struct RegistryCell<T> {
    label: &'static str,
    state: CellState<T>,
}

impl<T> RegistryCell<T> {
    /// Creates an open, empty registry.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            state: CellState::Open(RegistryBuilder::new(label)),
        }
    }

    /// Registry label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Adds an entry while the registry is open.
    pub fn register(&mut self, key: RegistryKey, value: T) -> Result<(), RegistryError> {
        match &mut self.state {
            CellState::Open(builder) => builder.register(key, value),
            CellState::Frozen(_) => Err(RegistryError::Frozen {
                registry: self.label,
                key,
            }),
        }
    }

    /// Whether `key` is registered, open or frozen.
    pub fn contains(&self, key: &RegistryKey) -> bool {
        match &self.state {
            CellState::Open(builder) => builder.contains(key),
            CellState::Frozen(registry) => registry.contains(key),
        }
    }

    /// Whether the freeze point has passed.
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, CellState::Frozen(_))
    }

    /// Freezes the registry. Idempotent: later calls return the same registry.
    pub fn freeze(&mut self) -> Arc<Registry<T>> {
        if let CellState::Frozen(registry) = &self.state {
            return Arc::clone(registry);
        }
        let placeholder = CellState::Frozen(Arc::new(Registry::empty(self.label)));
        let registry = match std::mem::replace(&mut self.state, placeholder) {
            CellState::Open(builder) => Arc::new(builder.freeze()),
            CellState::Frozen(registry) => registry,
        };
        self.state = CellState::Frozen(Arc::clone(&registry));
        registry
    }

    /// The frozen registry, if the freeze point has passed.
    pub fn frozen(&self) -> Option<Arc<Registry<T>>> {
        match &self.state {
            CellState::Open(_) => None,
            CellState::Frozen(registry) => Some(Arc::clone(registry)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> RegistryKey {
        RegistryKey::parse(s).unwrap()
    }

    #[test]
    fn lookups_follow_registration_order() {
        let mut builder = RegistryBuilder::new("test/numbers");
        builder.register(key("limlib:one"), 1).unwrap();
        builder.register(key("limlib:two"), 2).unwrap();
        builder.register(key("other:three"), 3).unwrap();

        let registry = builder.freeze();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(&key("limlib:two")), Some(&2));
        assert_eq!(registry.get_str("one"), Some(&1));
        assert_eq!(registry.get_str("other:three"), Some(&3));
        assert_eq!(registry.get_str("Not A Key"), None);

        let keys: Vec<String> = registry.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["limlib:one", "limlib:two", "other:three"]);
    }

    #[test]
    fn duplicate_key_leaves_builder_unchanged() {
        let mut builder = RegistryBuilder::new("test/numbers");
        builder.register(key("limlib:one"), 1).unwrap();

        let err = builder.register(key("limlib:one"), 99).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateKey { registry: "test/numbers", ref key } if key.path() == "one"
        ));
        assert_eq!(builder.len(), 1);

        let registry = builder.freeze();
        assert_eq!(registry.get_str("limlib:one"), Some(&1));
    }

    #[test]
    fn cell_rejects_registration_after_freeze() {
        let mut cell = RegistryCell::new("test/cell");
        assert!(cell.frozen().is_none());
        cell.register(key("limlib:a"), "a").unwrap();

        let first = cell.freeze();
        assert!(cell.is_frozen());
        assert_eq!(first.len(), 1);

        let err = cell.register(key("limlib:b"), "b").unwrap_err();
        assert!(matches!(err, RegistryError::Frozen { registry: "test/cell", .. }));
        assert!(!cell.contains(&key("limlib:b")));

        let second = cell.freeze();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &cell.frozen().unwrap()));
    }

    #[test]
    fn frozen_registry_is_shareable_across_threads() {
        let mut cell = RegistryCell::new("test/threads");
        for i in 0..8u32 {
            cell.register(key(&format!("limlib:n{i}")), i).unwrap();
        }
        let registry = cell.freeze();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..8u32)
                        .map(|i| *registry.get_str(&format!("limlib:n{i}")).unwrap())
                        .sum::<u32>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 28);
        }
    }
}
