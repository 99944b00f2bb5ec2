//! In-memory module registry with discovered built-in modules.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use tracing::debug;

use kiln_core::{
    application::{ApplicationError, ports::ModuleStore},
    domain::{DomainValidator as validator, ModuleDescriptor, ModuleId},
    error::{KilnError, KilnResult},
};

use crate::builtin_modules;

/// Thread-safe in-memory module store.
///
/// Ordered by id so listings and resolution over the whole registry are
/// deterministic.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    inner: Arc<RwLock<BTreeMap<ModuleId, ModuleDescriptor>>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with every module discovered on disk.
    pub fn with_builtin() -> KilnResult<Self> {
        let registry = Self::new();
        registry.load_builtin()?;
        Ok(registry)
    }

    /// Load built-in modules.
    pub fn load_builtin(&self) -> KilnResult<()> {
        for module in builtin_modules::all_modules()? {
            self.insert(module)?;
        }
        Ok(())
    }

    /// Seed from an iterator of descriptors; the first invalid one aborts.
    pub fn extend(&self, modules: impl IntoIterator<Item = ModuleDescriptor>) -> KilnResult<()> {
        for module in modules {
            self.insert(module)?;
        }
        Ok(())
    }

    /// Get the number of modules.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModuleStore for InMemoryRegistry {
    fn get(&self, id: &ModuleId) -> KilnResult<ModuleDescriptor> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(id).cloned().ok_or_else(|| {
            ApplicationError::ModuleNotFound { id: id.to_string() }.into()
        })
    }

    fn list(&self) -> KilnResult<Vec<ModuleDescriptor>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.values().cloned().collect())
    }

    fn insert(&self, module: ModuleDescriptor) -> KilnResult<()> {
        // Validate before insertion
        validator::validate_module(&module).map_err(KilnError::Domain)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        debug!(module = %module.id, "Registered module");
        inner.insert(module.id.clone(), module);
        Ok(())
    }

    fn contains(&self, id: &ModuleId) -> bool {
        self.inner
            .read()
            .map(|inner| inner.contains_key(id))
            .unwrap_or(false)
    }
}
