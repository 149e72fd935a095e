//! Resolution error taxonomy.
//!
//! Every failure path surfaces as a distinct [`ResolveError`] variant so
//! callers can branch on failure kind — "no such module" and "module loaded
//! but symbol missing" are different decisions at the call site. The
//! resolver never retries and never returns a partial result.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::executor::ExecError;

/// An error produced during module or class resolution.
#[derive(Debug)]
pub enum ResolveError {
    /// No file matches the requested reference under the given root.
    NotFound {
        reference: Arc<str>,
        root: PathBuf,
    },

    /// Recursive search matched more than one candidate under the strict
    /// ambiguity policy. Candidates are in deterministic walk order.
    Ambiguous {
        name: Arc<str>,
        candidates: Vec<PathBuf>,
    },

    /// The located file could not be read or executed. The underlying
    /// cause is preserved and reachable through [`std::error::Error::source`].
    LoadFailed {
        module: Arc<str>,
        path: PathBuf,
        cause: ExecError,
    },

    /// The module loaded, but the requested attribute is absent.
    AttributeMissing {
        module: Arc<str>,
        attribute: Arc<str>,
    },

    /// The reference itself is malformed (empty segment, non-identifier
    /// characters, ...).
    InvalidReference {
        reference: Arc<str>,
        reason: Arc<str>,
    },
}

impl ResolveError {
    pub fn not_found(reference: impl Into<Arc<str>>, root: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            reference: reference.into(),
            root: root.into(),
        }
    }

    pub fn ambiguous(name: impl Into<Arc<str>>, candidates: Vec<PathBuf>) -> Self {
        Self::Ambiguous {
            name: name.into(),
            candidates,
        }
    }

    pub fn load_failed(module: impl Into<Arc<str>>, path: &Path, cause: ExecError) -> Self {
        Self::LoadFailed {
            module: module.into(),
            path: path.to_path_buf(),
            cause,
        }
    }

    pub fn attribute_missing(module: impl Into<Arc<str>>, attribute: impl Into<Arc<str>>) -> Self {
        Self::AttributeMissing {
            module: module.into(),
            attribute: attribute.into(),
        }
    }

    pub fn invalid_reference(reference: impl Into<Arc<str>>, reason: impl Into<Arc<str>>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { reference, root } => {
                write!(f, "no module named '{}' under {}", reference, root.display())
            }
            Self::Ambiguous { name, candidates } => {
                write!(
                    f,
                    "ambiguous module name '{}': {} candidates, first is {}",
                    name,
                    candidates.len(),
                    candidates
                        .first()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )
            }
            Self::LoadFailed { module, path, cause } => {
                write!(
                    f,
                    "failed to load module '{}' from {}: {}",
                    module,
                    path.display(),
                    cause
                )
            }
            Self::AttributeMissing { module, attribute } => {
                write!(f, "module '{}' has no attribute '{}'", module, attribute)
            }
            Self::InvalidReference { reference, reason } => {
                write!(f, "invalid module reference '{}': {}", reference, reason)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LoadFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
