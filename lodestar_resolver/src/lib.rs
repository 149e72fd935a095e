//! Dynamic module location, loading, and class resolution.
//!
//! Translates logical, string-based module and class identifiers into
//! loaded objects at runtime, without a static import dependency at the
//! call site — the late-binding escape hatch for the few places (plugin
//! discovery, mutually-referential models) where a static dependency would
//! create a cycle.
//!
//! # Architecture
//!
//! ```text
//! Resolver
//!   ├── ModuleRef          (dotted/slash reference parsing)
//!   ├── locate             (exact probe + deterministic recursive search)
//!   ├── ModuleRegistry     (RwLock<FxHashMap>, at-most-once execution)
//!   ├── ModuleExecutor     (execution seam; SourceExecutor for .lode)
//!   └── ModuleObject       (loaded namespace with metadata dunders)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lodestar_resolver::Resolver;
//!
//! let resolver = Resolver::new();
//! let module = resolver.load_module(root, "model.locale")?;
//! let class = resolver.load_class(root, "model.locale.Locale")?;
//! ```
//!
//! Loading is idempotent per registry: resolving the same reference twice
//! returns the same handle, and module-level execution happens once. Every
//! failure is a typed [`ResolveError`] — no partial results, no internal
//! retries.

pub mod config;
pub mod error;
pub mod executor;
pub mod locate;
pub mod module_object;
pub mod module_ref;
pub mod project;
pub mod registry;
pub mod resolver;

pub use config::{AmbiguityPolicy, ResolverConfig};
pub use error::ResolveError;
pub use executor::{ExecError, ModuleExecutor, SourceExecutor};
pub use locate::Located;
pub use module_object::ModuleObject;
pub use module_ref::ModuleRef;
pub use project::{project_root, ProjectRootError};
pub use registry::{global_registry, ModuleRegistry};
pub use resolver::Resolver;
