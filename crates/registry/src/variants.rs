//! Key <-> descriptor bijection for one effect family.

use std::collections::HashMap;
use std::sync::Arc;

use limlib_core::RegistryKey;

use crate::{Descriptor, DescriptorId, EffectFamily, Registry, RegistryCell, RegistryError};

/// Variant registry for family `F`.
///
/// Keys are unique, and each descriptor is registered under exactly one key.
/// [`VariantRegistry::freeze`] is the point after which the table is
/// immutable and a [`crate::DispatchCodec`] can be built from it.
pub struct VariantRegistry<F: EffectFamily> {
    cell: RegistryCell<Descriptor<F>>,
    by_descriptor: HashMap<DescriptorId, RegistryKey>,
    table: Option<VariantTable<F>>,
}

impl<F: EffectFamily> VariantRegistry<F> {
    /// Creates an open registry labelled with the family name.
    pub fn new() -> Self {
        Self {
            cell: RegistryCell::new(F::NAME),
            by_descriptor: HashMap::new(),
            table: None,
        }
    }

    /// Registers `descriptor` under `key`.
    ///
    /// Fails on a frozen registry, a taken key, or a descriptor that already
    /// has a key. A taken key is reported before the descriptor check.
    /// Nothing is modified on failure.
    pub fn register(
        &mut self,
        key: RegistryKey,
        descriptor: Descriptor<F>,
    ) -> Result<(), RegistryError> {
        let id = descriptor.id();
        if !self.cell.is_frozen() {
            if self.cell.contains(&key) {
                return Err(RegistryError::DuplicateKey {
                    registry: F::NAME,
                    key,
                });
            }
            if let Some(existing) = self.by_descriptor.get(&id) {
                return Err(RegistryError::DuplicateDescriptor {
                    registry: F::NAME,
                    descriptor: id,
                    existing: existing.clone(),
                });
            }
        }
        self.cell.register(key.clone(), descriptor)?;
        self.by_descriptor.insert(id, key);
        Ok(())
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &RegistryKey) -> bool {
        self.cell.contains(key)
    }

    /// Whether the freeze point has passed.
    pub fn is_frozen(&self) -> bool {
        self.cell.is_frozen()
    }

    /// Freezes the registry and returns the shared lookup table. Idempotent.
    pub fn freeze(&mut self) -> VariantTable<F> {
        if let Some(table) = &self.table {
            return table.clone();
        }
        let table = VariantTable {
            by_key: self.cell.freeze(),
            by_descriptor: Arc::new(std::mem::take(&mut self.by_descriptor)),
        };
        self.table = Some(table.clone());
        table
    }
}

impl<F: EffectFamily> Default for VariantRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen, shareable lookup table for one family.
pub struct VariantTable<F: EffectFamily> {
    by_key: Arc<Registry<Descriptor<F>>>,
    by_descriptor: Arc<HashMap<DescriptorId, RegistryKey>>,
}

impl<F: EffectFamily> Clone for VariantTable<F> {
    fn clone(&self) -> Self {
        Self {
            by_key: Arc::clone(&self.by_key),
            by_descriptor: Arc::clone(&self.by_descriptor),
        }
    }
}

impl<F: EffectFamily> VariantTable<F> {
    /// Descriptor registered under `key`; used when decoding.
    pub fn lookup_by_key(&self, key: &RegistryKey) -> Option<&Descriptor<F>> {
        self.by_key.get(key)
    }

    /// Key a value's variant is registered under; used when encoding.
    pub fn lookup_by_instance(&self, value: &F) -> Option<&RegistryKey> {
        self.key_of(value.descriptor_id())
    }

    /// Key a descriptor is registered under.
    pub fn key_of(&self, id: DescriptorId) -> Option<&RegistryKey> {
        self.by_descriptor.get(&id)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &RegistryKey> {
        self.by_key.keys()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns true if no variant is registered.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
