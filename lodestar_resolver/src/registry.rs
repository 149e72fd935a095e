//! Module registry: the process cache of loaded modules.
//!
//! The registry is the single source of truth for "is this module already
//! loaded": loading the same logical name twice yields the same handle, and
//! module-level execution happens at most once per registry.
//!
//! Registries are explicit, injectable objects so tests and embedders can
//! hold several independent caches in one process; a process-wide instance
//! is available through [`global_registry`] for callers that want the
//! `sys.modules` behavior.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::module_object::ModuleObject;

// =============================================================================
// ModuleRegistry
// =============================================================================

/// Cache of loaded modules keyed by logical dotted name.
#[derive(Debug)]
pub struct ModuleRegistry {
    modules: RwLock<FxHashMap<Arc<str>, Arc<ModuleObject>>>,
}

impl ModuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(FxHashMap::default()),
        }
    }

    /// Look up a cached module.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Arc<ModuleObject>> {
        self.modules.read().get(name).cloned()
    }

    /// Register a module directly, bypassing loading.
    ///
    /// Injected modules win over filesystem loading: a subsequent load of
    /// the same name returns this handle. Replacing an existing entry is
    /// allowed (and logged), matching re-registration semantics.
    pub fn insert(&self, name: impl Into<Arc<str>>, module: Arc<ModuleObject>) {
        let name = name.into();
        let previous = self.modules.write().insert(name.clone(), module);
        if previous.is_some() {
            log::warn!("replaced already-registered module '{}'", name);
        }
    }

    /// Remove a module from the cache.
    ///
    /// A subsequent load re-executes the source into a fresh handle.
    pub fn remove(&self, name: &str) -> Option<Arc<ModuleObject>> {
        self.modules.write().remove(name)
    }

    /// Check whether a module is cached.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// Names of all cached modules.
    pub fn names(&self) -> Vec<Arc<str>> {
        self.modules.read().keys().cloned().collect()
    }

    /// Number of cached modules.
    #[inline]
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// Whether the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }

    /// Return the cached module, or run `load` and cache its result.
    ///
    /// The check-then-insert is atomic with respect to this registry: the
    /// write lock is held across `load`, so concurrent callers racing on an
    /// unregistered name execute the loader exactly once.
    ///
    /// The loader must not call back into this registry — the lock is not
    /// reentrant.
    pub fn get_or_load<E>(
        &self,
        name: &str,
        load: impl FnOnce() -> Result<Arc<ModuleObject>, E>,
    ) -> Result<Arc<ModuleObject>, E> {
        // Fast path: already cached.
        if let Some(module) = self.modules.read().get(name) {
            log::trace!("module cache hit for '{}'", name);
            return Ok(module.clone());
        }

        let mut modules = self.modules.write();
        // Re-check: another thread may have loaded while we waited.
        if let Some(module) = modules.get(name) {
            return Ok(module.clone());
        }

        let module = load()?;
        modules.insert(Arc::from(name), module.clone());
        log::debug!("registered module '{}'", name);
        Ok(module)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Global Registry Access
// =============================================================================

/// Process-wide registry singleton.
static GLOBAL_REGISTRY: OnceLock<Arc<ModuleRegistry>> = OnceLock::new();

/// Get the process-wide module registry.
pub fn global_registry() -> &'static Arc<ModuleRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| Arc::new(ModuleRegistry::new()))
}

// =============================================================================
// Tests
// =============================================================================
