//! The resolver: locate, load, and extract in one place.
//!
//! A [`Resolver`] owns a configuration, a registry handle, and an executor,
//! and exposes the resolution operations. The root directory is an argument
//! to every operation, not resolver state: the resolver anchors nothing to
//! a particular tree beyond a single call.
//!
//! The primary entry points are [`Resolver::load_module`] and
//! [`Resolver::load_class`], the late-binding alternative to a static
//! dependency: two components can reference each other's classes by name
//! without a static cycle, with the registry guaranteeing at-most-once
//! execution of each module.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lodestar_core::Value;

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::executor::{ExecError, ModuleExecutor, SourceExecutor};
use crate::locate::{find_by_name, find_module_source, Located};
use crate::module_object::ModuleObject;
use crate::module_ref::ModuleRef;
use crate::registry::ModuleRegistry;

// =============================================================================
// Resolver
// =============================================================================

/// Translates logical module/class identifiers into loaded objects.
pub struct Resolver {
    config: ResolverConfig,
    registry: Arc<ModuleRegistry>,
    executor: Arc<dyn ModuleExecutor>,
}

impl Resolver {
    /// Create a resolver with default configuration, a fresh registry, and
    /// the `.lode` source executor.
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    /// Create a resolver with the given configuration.
    pub fn with_config(config: ResolverConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(ModuleRegistry::new()),
            Arc::new(SourceExecutor),
        )
    }

    /// Create a resolver from explicit parts.
    ///
    /// Sharing one registry across resolvers shares their module cache;
    /// a custom executor substitutes the execution facility.
    pub fn with_parts(
        config: ResolverConfig,
        registry: Arc<ModuleRegistry>,
        executor: Arc<dyn ModuleExecutor>,
    ) -> Self {
        Self {
            config,
            registry,
            executor,
        }
    }

    /// The resolver's configuration.
    #[inline]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The registry backing this resolver.
    #[inline]
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    // =========================================================================
    // Locate
    // =========================================================================

    /// Locate the source file for a reference under `root`.
    ///
    /// Probes the exact path first; when that misses and
    /// [`recursive_fallback`](ResolverConfig::recursive_fallback) is on,
    /// falls back to a recursive stem search for the leaf segment.
    pub fn locate(&self, root: &Path, reference: &str) -> Result<Located, ResolveError> {
        let mref = ModuleRef::parse(reference)?;
        self.locate_ref(root, &mref)
    }

    /// Locate a bare name by recursive search only.
    pub fn locate_by_name(&self, root: &Path, name: &str) -> Result<Located, ResolveError> {
        let mref = ModuleRef::parse(name)?;
        if !mref.is_simple() {
            return Err(ResolveError::invalid_reference(
                name,
                "recursive search takes a bare name, not a path",
            ));
        }
        find_by_name(root, mref.leaf(), &self.config)
    }

    fn locate_ref(&self, root: &Path, mref: &ModuleRef) -> Result<Located, ResolveError> {
        if let Some(located) = find_module_source(root, mref, &self.config) {
            return Ok(located);
        }

        if self.config.recursive_fallback {
            log::debug!(
                "exact probe missed for '{}', searching for '{}' recursively",
                mref.full_name(),
                mref.leaf()
            );
            return find_by_name(root, mref.leaf(), &self.config)
                .map_err(|err| match err {
                    // Report the full reference, not just the leaf.
                    ResolveError::NotFound { root, .. } => {
                        ResolveError::not_found(mref.full_name(), root)
                    }
                    other => other,
                });
        }

        Err(ResolveError::not_found(mref.full_name(), root))
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Load the file at `path` under the logical name `name`.
    ///
    /// Registers the module in the registry; if the name is already
    /// registered, returns the cached handle without re-executing.
    pub fn load(&self, path: &Path, name: &str) -> Result<Arc<ModuleObject>, ResolveError> {
        let mref = ModuleRef::parse(name)?;
        let is_package = path
            .file_name()
            .map(|f| f == self.config.init_file.as_ref())
            .unwrap_or(false);
        self.registry
            .get_or_load(mref.full_name(), || {
                self.execute_source(path, &mref, is_package)
            })
    }

    /// Locate and load a module reference under `root`.
    ///
    /// The registry is consulted before the filesystem, so injected and
    /// already-loaded modules win without touching the tree.
    pub fn load_module(&self, root: &Path, reference: &str) -> Result<Arc<ModuleObject>, ResolveError> {
        let mref = ModuleRef::parse(reference)?;
        self.load_module_ref(root, &mref)
    }

    fn load_module_ref(
        &self,
        root: &Path,
        mref: &ModuleRef,
    ) -> Result<Arc<ModuleObject>, ResolveError> {
        if let Some(module) = self.registry.get(mref.full_name()) {
            return Ok(module);
        }

        let located = self.locate_ref(root, mref)?;
        log::debug!(
            "loading module '{}' from {}",
            mref.full_name(),
            located.path.display()
        );
        self.registry.get_or_load(mref.full_name(), || {
            self.execute_source(&located.path, mref, located.is_package)
        })
    }

    fn execute_source(
        &self,
        path: &Path,
        mref: &ModuleRef,
        is_package: bool,
    ) -> Result<Arc<ModuleObject>, ResolveError> {
        let source = fs::read_to_string(path).map_err(|err| {
            ResolveError::load_failed(
                mref.full_name(),
                path,
                ExecError::failed(format!("failed to read source: {}", err)),
            )
        })?;

        // A package module is its own package; a plain module belongs to
        // its parent.
        let package = if is_package {
            Some(Arc::from(mref.full_name()))
        } else {
            mref.parent().map(|p| Arc::from(p.full_name()))
        };
        let file = Some(Arc::from(path.to_string_lossy().as_ref()));

        let module = Arc::new(ModuleObject::with_metadata(mref.full_name(), file, package));
        self.executor
            .execute(&source, &module)
            .map_err(|cause| ResolveError::load_failed(mref.full_name(), path, cause))?;
        Ok(module)
    }

    // =========================================================================
    // Extract
    // =========================================================================

    /// Extract a named attribute from a loaded module.
    pub fn attribute(&self, module: &ModuleObject, name: &str) -> Result<Value, ResolveError> {
        module
            .get_attr(name)
            .ok_or_else(|| ResolveError::attribute_missing(module.name(), name))
    }

    /// Resolve a qualified class (or attribute) name under `root`.
    ///
    /// `model.locale.Locale` loads the module `model.locale` and extracts
    /// `Locale`. A bare name such as `Locale` is located by recursive stem
    /// search (`Locale.lode` anywhere under the root) and the attribute of
    /// the same name is extracted from it.
    pub fn load_class(&self, root: &Path, qualified: &str) -> Result<Value, ResolveError> {
        let qref = ModuleRef::parse(qualified)?;

        match qref.parent() {
            Some(module_ref) => {
                let module = self.load_module_ref(root, &module_ref)?;
                self.attribute(&module, qref.leaf())
            }
            None => {
                // Depth-agnostic search: the class's module file carries
                // the class's name as its stem.
                let module = self.load_module_ref(root, &qref)?;
                self.attribute(&module, qref.leaf())
            }
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
