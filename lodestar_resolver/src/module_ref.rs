//! Logical module references.
//!
//! A [`ModuleRef`] is a validated, pre-split logical path identifying a
//! loadable source unit relative to a root directory. Dotted (`a.b.c`) and
//! slash-delimited (`a/b/c`) spellings are equivalent; the canonical form
//! is dotted, and it doubles as the registry cache key.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::ResolveError;

// =============================================================================
// ModuleRef
// =============================================================================

/// Parsed module reference with pre-split segments.
///
/// Avoids re-splitting on each resolution attempt. The common case is 2-3
/// segments, so segment storage is inline.
#[derive(Debug, Clone)]
pub struct ModuleRef {
    /// Canonical dotted name (e.g. `model.locale`).
    full_name: Arc<str>,
    /// Pre-split segments (e.g. `["model", "locale"]`).
    segments: SmallVec<[Arc<str>; 4]>,
}

impl ModuleRef {
    /// Parse a dotted or slash-delimited reference.
    ///
    /// Every segment must be a non-empty identifier
    /// (`[A-Za-z_][A-Za-z0-9_]*`); anything else is an
    /// [`InvalidReference`](ResolveError::InvalidReference) error.
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        if reference.is_empty() {
            return Err(ResolveError::invalid_reference(reference, "empty reference"));
        }

        let normalized = reference.replace('/', ".");
        let mut segments = SmallVec::new();
        for segment in normalized.split('.') {
            if segment.is_empty() {
                return Err(ResolveError::invalid_reference(reference, "empty path segment"));
            }
            if !is_identifier(segment) {
                return Err(ResolveError::invalid_reference(
                    reference,
                    format!("segment '{}' is not an identifier", segment),
                ));
            }
            segments.push(Arc::from(segment));
        }

        Ok(Self {
            full_name: Arc::from(normalized),
            segments,
        })
    }

    /// Build a reference from pre-validated segments.
    fn from_segments(segments: &[Arc<str>]) -> Self {
        let full_name = segments
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(".");
        Self {
            full_name: Arc::from(full_name),
            segments: segments.iter().cloned().collect(),
        }
    }

    /// The canonical dotted name.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The split segments.
    #[inline]
    pub fn segments(&self) -> &[Arc<str>] {
        &self.segments
    }

    /// Whether this is a single-segment reference.
    #[inline]
    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }

    /// Number of segments.
    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The final segment (the module or class name proper).
    #[inline]
    pub fn leaf(&self) -> &str {
        // Parsing guarantees at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    /// The containing package reference, or `None` for a simple reference.
    pub fn parent(&self) -> Option<ModuleRef> {
        if self.is_simple() {
            None
        } else {
            Some(Self::from_segments(&self.segments[..self.segments.len() - 1]))
        }
    }

    /// The dotted name truncated to `depth` segments.
    ///
    /// E.g. for `a.b.c`, depth 2 is `a.b`.
    pub fn name_at_depth(&self, depth: usize) -> String {
        let depth = depth.min(self.segments.len());
        self.segments[..depth]
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

impl PartialEq for ModuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

impl Eq for ModuleRef {}

/// Check for `[A-Za-z_][A-Za-z0-9_]*`.
fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// =============================================================================
// Tests
// =============================================================================
