//! Project root derivation.
//!
//! Given a module's file path and its logical name, the project root is a
//! fixed number of ancestors up: one per name segment (the package init
//! file counts one fewer, since it names its own directory), plus however
//! many source directories (`src/`-style) sit between the root and the
//! top-level package.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::module_ref::ModuleRef;

/// Failure to derive a project root.
#[derive(Debug, Clone)]
pub struct ProjectRootError {
    pub message: Arc<str>,
}

impl fmt::Display for ProjectRootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProjectRootError {}

/// Derive the project root directory for a module.
///
/// `source_depth` is the number of directories between the project root
/// and the top-level package (1 for the common `src/` layout, 0 when
/// packages sit directly in the root).
///
/// For `<proj>/src/model/locale.lode` with reference `model.locale` and
/// `source_depth` 1, the result is `<proj>`.
pub fn project_root(
    module_file: &Path,
    module_ref: &ModuleRef,
    source_depth: usize,
    config: &ResolverConfig,
) -> Result<PathBuf, ProjectRootError> {
    let is_init = module_file
        .file_name()
        .map(|f| f == config.init_file.as_ref())
        .unwrap_or(false);

    // One ancestor per segment; a plain module file does not occupy a
    // directory level of its own, an init file's directory does.
    let mut levels = module_ref.depth();
    if !is_init {
        levels -= 1;
    }
    let levels = levels + source_depth;

    // ancestors() yields the path itself first, so the file's directory is
    // at index 1.
    module_file
        .ancestors()
        .nth(levels + 1)
        .map(Path::to_path_buf)
        .ok_or_else(|| ProjectRootError {
            message: Arc::from(format!(
                "path {} is too shallow for module '{}' at source depth {}",
                module_file.display(),
                module_ref.full_name(),
                source_depth
            )),
        })
}

// =============================================================================
// Tests
// =============================================================================
