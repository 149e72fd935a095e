//! Filesystem location of module sources.
//!
//! Two probe modes:
//!
//! - **Exact**: root + reference segments map directly onto the tree,
//!   probing the package form (`<leaf>/__init__.lode`) before the plain
//!   module file (`<leaf>.lode`).
//! - **Recursive**: a pre-order walk beneath the root collecting files
//!   whose stem equals a bare name. Directory entries are sorted at every
//!   level, so the traversal order — and therefore the first match — is a
//!   deterministic contract, not a filesystem accident.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{AmbiguityPolicy, ResolverConfig};
use crate::error::ResolveError;
use crate::module_ref::ModuleRef;

// =============================================================================
// Located
// =============================================================================

/// Outcome of a successful location probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Absolute path to the module source file.
    pub path: PathBuf,
    /// Whether the match is a package init file.
    pub is_package: bool,
}

/// Canonicalize when possible; the probed path already exists, so failures
/// here (e.g. a concurrent unlink) fall back to the joined form.
fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

// =============================================================================
// Exact Probe
// =============================================================================

/// Resolve a reference to a source file directly under `root`.
///
/// For `a.b`, probes:
/// 1. `<root>/a/b/__init__.lode` (package)
/// 2. `<root>/a/b.lode` (module)
///
/// Intermediate segments are plain directories; no init file is required
/// along the way.
pub fn find_module_source(
    root: &Path,
    reference: &ModuleRef,
    config: &ResolverConfig,
) -> Option<Located> {
    let segments = reference.segments();
    let mut dir = root.to_path_buf();
    for segment in &segments[..segments.len() - 1] {
        dir.push(segment.as_ref());
    }
    let leaf = reference.leaf();

    // Package directory (leaf/__init__.lode)
    let init = dir.join(leaf).join(config.init_file.as_ref());
    if init.is_file() {
        return Some(Located {
            path: canonical(init),
            is_package: true,
        });
    }

    // Module file (leaf.lode)
    let file = dir.join(format!("{}.{}", leaf, config.extension));
    if file.is_file() {
        return Some(Located {
            path: canonical(file),
            is_package: false,
        });
    }

    None
}

// =============================================================================
// Recursive Search
// =============================================================================

/// Collect every file beneath `root` whose stem equals `name`, in
/// deterministic walk order.
pub fn search_by_name(root: &Path, name: &str, config: &ResolverConfig) -> Vec<PathBuf> {
    let mut matches = Vec::new();
    walk(root, name, config, 0, &mut matches);
    matches
}

fn walk(dir: &Path, name: &str, config: &ResolverConfig, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > config.max_search_depth {
        log::warn!(
            "recursive search exceeded max depth {} at {}",
            config.max_search_depth,
            dir.display()
        );
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        // Unreadable directories are skipped, not fatal.
        Err(err) => {
            log::debug!("skipping unreadable directory {}: {}", dir.display(), err);
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            if config.skip_hidden && is_hidden(&path) {
                continue;
            }
            walk(&path, name, config, depth + 1, out);
        } else if matches_stem(&path, name, config) {
            out.push(canonical(path));
        }
    }
}

/// Resolve a bare name by recursive search, applying the ambiguity policy.
pub fn find_by_name(
    root: &Path,
    name: &str,
    config: &ResolverConfig,
) -> Result<Located, ResolveError> {
    let matches = search_by_name(root, name, config);

    let path = match matches.len() {
        0 => return Err(ResolveError::not_found(name, root)),
        1 => matches.into_iter().next().unwrap_or_default(),
        n => match config.ambiguity {
            AmbiguityPolicy::Strict => {
                return Err(ResolveError::ambiguous(name, matches));
            }
            AmbiguityPolicy::FirstMatch => {
                log::debug!(
                    "recursive search for '{}' matched {} files, taking first: {}",
                    name,
                    n,
                    matches[0].display()
                );
                matches.into_iter().next().unwrap_or_default()
            }
        },
    };

    let is_package = path
        .file_name()
        .map(|f| f == config.init_file.as_ref())
        .unwrap_or(false);
    Ok(Located { path, is_package })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn matches_stem(path: &Path, name: &str, config: &ResolverConfig) -> bool {
    let extension_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == config.extension.as_ref())
        .unwrap_or(false);
    extension_matches
        && path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s == name)
            .unwrap_or(false)
}

// =============================================================================
// Tests
// =============================================================================
