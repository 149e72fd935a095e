//! Resolver configuration.
//!
//! All knobs are resolved once at construction; resolution calls read from
//! the config without any per-operation cost.

use std::sync::Arc;

/// Policy for recursive searches that match more than one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Take the first match in the deterministic walk order (default).
    ///
    /// The walk is a pre-order traversal with directory entries sorted
    /// lexicographically at every level, so "first" is a stable contract,
    /// not a filesystem accident.
    FirstMatch,
    /// Fail fast with [`ResolveError::Ambiguous`] listing every candidate.
    ///
    /// [`ResolveError::Ambiguous`]: crate::error::ResolveError::Ambiguous
    Strict,
}

/// Configuration for a [`Resolver`](crate::resolver::Resolver).
///
/// # Example
///
/// ```ignore
/// use lodestar_resolver::{AmbiguityPolicy, ResolverConfig};
///
/// // Fail-fast configuration for callers that treat ambiguity as a bug.
/// let config = ResolverConfig {
///     ambiguity: AmbiguityPolicy::Strict,
///     recursive_fallback: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Module source file extension, without the leading dot.
    ///
    /// Default: `lode`
    pub extension: Arc<str>,

    /// File name marking a directory as a package.
    ///
    /// Default: `__init__.lode`
    pub init_file: Arc<str>,

    /// Fall back to a recursive stem search for the leaf segment when the
    /// exact probe misses.
    ///
    /// Default: `true`
    pub recursive_fallback: bool,

    /// What to do when a recursive search matches more than one file.
    ///
    /// Default: [`AmbiguityPolicy::FirstMatch`]
    pub ambiguity: AmbiguityPolicy,

    /// Maximum directory depth for recursive searches, counted from the
    /// root (0 = the root directory itself).
    ///
    /// Default: 32
    pub max_search_depth: usize,

    /// Skip dot-prefixed directories during recursive searches.
    ///
    /// Default: `true`
    pub skip_hidden: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extension: Arc::from("lode"),
            init_file: Arc::from("__init__.lode"),
            recursive_fallback: true,
            ambiguity: AmbiguityPolicy::FirstMatch,
            max_search_depth: 32,
            skip_hidden: true,
        }
    }
}
