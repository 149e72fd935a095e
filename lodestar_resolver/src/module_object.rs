//! `ModuleObject` - runtime representation of a loaded module.
//!
//! A loaded module is a named attribute namespace. Attribute lookup is O(1)
//! via `FxHashMap` with interned string keys; the table is behind a
//! `parking_lot::RwLock` so concurrent readers never contend.

use std::sync::Arc;

use lodestar_core::{intern, InternedString, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

// =============================================================================
// ModuleObject
// =============================================================================

/// A loaded module with attribute storage.
///
/// Stores the metadata dunders (`__name__`, `__file__`, `__package__`, and
/// `__doc__` once the source's docstring executes) alongside the
/// attributes the module's statements bound.
#[derive(Debug)]
pub struct ModuleObject {
    /// Logical dotted name (e.g. `model.locale`).
    name: Arc<str>,

    /// Module attributes, dunders included.
    attrs: RwLock<FxHashMap<InternedString, Value>>,

    /// Source file path (None for injected modules).
    file: Option<Arc<str>>,

    /// Containing package name (e.g. `model` for `model.locale`).
    package: Option<Arc<str>>,
}

impl ModuleObject {
    /// Create a new empty module with the given name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_metadata(name, None, None)
    }

    /// Create a new module with source metadata.
    pub fn with_metadata(
        name: impl Into<Arc<str>>,
        file: Option<Arc<str>>,
        package: Option<Arc<str>>,
    ) -> Self {
        let name = name.into();
        let mut attrs = FxHashMap::default();

        attrs.insert(intern("__name__"), Value::str(&name));
        if let Some(ref file) = file {
            attrs.insert(intern("__file__"), Value::str(file));
        }
        if let Some(ref package) = package {
            attrs.insert(intern("__package__"), Value::str(package));
        }

        Self {
            name,
            attrs: RwLock::new(attrs),
            file,
            package,
        }
    }

    /// The logical dotted name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source file path, if the module came from disk.
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The containing package name, if known.
    #[inline]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// The module docstring, if the source declared one.
    pub fn doc(&self) -> Option<InternedString> {
        match self.get_attr("__doc__") {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Get an attribute from the module.
    ///
    /// Returns `None` if the attribute doesn't exist.
    #[inline]
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    /// Set an attribute on the module.
    #[inline]
    pub fn set_attr(&self, name: &str, value: Value) {
        self.attrs.write().insert(intern(name), value);
    }

    /// Set an attribute using a pre-interned key.
    #[inline]
    pub fn set_attr_interned(&self, name: InternedString, value: Value) {
        self.attrs.write().insert(name, value);
    }

    /// Check if the module has an attribute.
    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.read().contains_key(name)
    }

    /// All attribute names, dunders included.
    pub fn attr_names(&self) -> Vec<InternedString> {
        self.attrs.read().keys().cloned().collect()
    }

    /// Public attribute names (not underscore-prefixed).
    pub fn public_attr_names(&self) -> Vec<InternedString> {
        self.attrs
            .read()
            .keys()
            .filter(|k| !k.as_str().starts_with('_'))
            .cloned()
            .collect()
    }

    /// Number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attrs.read().len()
    }

    /// Whether the module has no attributes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attrs.read().is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_new() {
        let module = ModuleObject::new("test_module");
        assert_eq!(module.name(), "test_module");
        assert!(module.has_attr("__name__"));
        assert_eq!(
            module.get_attr("__name__").and_then(|v| v.as_str().map(String::from)),
            Some("test_module".to_string())
        );
    }

    #[test]
    fn test_module_get_set_attr() {
        let module = ModuleObject::new("test");
        module.set_attr("foo", Value::int(42));
        assert!(module.has_attr("foo"));
        assert_eq!(module.get_attr("foo").and_then(|v| v.as_int()), Some(42));
        assert!(module.get_attr("bar").is_none());
    }

    #[test]
    fn test_module_rebinding_last_wins() {
        let module = ModuleObject::new("test");
        module.set_attr("x", Value::int(1));
        module.set_attr("x", Value::int(2));
        assert_eq!(module.get_attr("x").and_then(|v| v.as_int()), Some(2));
    }

    #[test]
    fn test_module_with_metadata() {
        let module = ModuleObject::with_metadata(
            "model.locale",
            Some(Arc::from("/src/model/locale.lode")),
            Some(Arc::from("model")),
        );

        assert_eq!(module.name(), "model.locale");
        assert_eq!(module.file(), Some("/src/model/locale.lode"));
        assert_eq!(module.package(), Some("model"));
        assert!(module.has_attr("__file__"));
        assert!(module.has_attr("__package__"));
    }

    #[test]
    fn test_module_doc_from_attr() {
        let module = ModuleObject::new("test");
        assert!(module.doc().is_none());
        module.set_attr("__doc__", Value::str("Module docs."));
        assert_eq!(module.doc().as_deref(), Some("Module docs."));
    }

    #[test]
    fn test_public_attr_names() {
        let module = ModuleObject::new("test");
        module.set_attr("public", Value::int(1));
        module.set_attr("_private", Value::int(2));

        let public: Vec<String> = module
            .public_attr_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert!(public.contains(&"public".to_string()));
        assert!(!public.contains(&"_private".to_string()));
        assert!(!public.contains(&"__name__".to_string()));
    }

    #[test]
    fn test_module_len_and_is_empty() {
        let module = ModuleObject::new("test");
        // Has at least __name__.
        assert!(!module.is_empty());
        assert!(module.len() >= 1);
    }

    #[test]
    fn test_module_concurrent_access() {
        use std::thread;

        let module = Arc::new(ModuleObject::new("concurrent"));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let m = Arc::clone(&module);
                thread::spawn(move || {
                    m.set_attr(&format!("attr_{}", i), Value::int(i));
                    m.get_attr(&format!("attr_{}", i))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }

        for i in 0..10 {
            assert!(module.has_attr(&format!("attr_{}", i)));
        }
    }
}
