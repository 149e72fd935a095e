//! String interning for attribute and module names.
//!
//! Attribute lookup is the hot path of the resolver, so attribute keys are
//! interned once and compared by pointer afterwards. The pool never evicts:
//! two [`InternedString`]s with equal content always share the same
//! allocation for the lifetime of the process.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

// =============================================================================
// InternedString
// =============================================================================

/// A handle to a string in the process-wide intern pool.
///
/// Cloning is a reference-count bump. Equality checks the pointer first and
/// falls back to content comparison; hashing is by content, so an
/// `InternedString` key can be looked up with a plain `&str`.
#[derive(Clone)]
pub struct InternedString(Arc<str>);

impl InternedString {
    /// View the interned contents.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether two handles point at the same pool entry.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for InternedString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InternedString {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for InternedString {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq for InternedString {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for InternedString {}

impl PartialEq<str> for InternedString {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for InternedString {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for InternedString {
    // Content hash, matching `str::hash`, so `FxHashMap<InternedString, _>`
    // supports `&str` lookups through `Borrow<str>`.
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialOrd for InternedString {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternedString {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<InternedString> for Arc<str> {
    #[inline]
    fn from(s: InternedString) -> Arc<str> {
        s.0
    }
}

// =============================================================================
// Pool
// =============================================================================

/// Process-wide intern pool. Keys double as the stored allocation.
static POOL: OnceLock<DashMap<Arc<str>, (), FxBuildHasher>> = OnceLock::new();

#[inline]
fn pool() -> &'static DashMap<Arc<str>, (), FxBuildHasher> {
    POOL.get_or_init(DashMap::default)
}

/// Intern a string, returning the canonical handle for its contents.
pub fn intern(s: &str) -> InternedString {
    let pool = pool();

    // Fast path: already interned.
    if let Some(entry) = pool.get(s) {
        return InternedString(entry.key().clone());
    }

    // Slow path: insert, racing inserts converge on the first stored key.
    let candidate: Arc<str> = Arc::from(s);
    let entry = pool.entry(candidate).or_insert(());
    InternedString(entry.key().clone())
}

// =============================================================================
// Tests
// =============================================================================
