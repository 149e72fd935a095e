//! Runtime values for module attributes.
//!
//! A loaded module is a namespace of [`Value`]s: the constants its source
//! declared, plus the class objects its `class` blocks produced. Values are
//! cheap to clone — strings are interned, lists and classes are shared
//! behind `Arc`.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::intern::{intern, InternedString};

// =============================================================================
// Value
// =============================================================================

/// A module attribute value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value (`None` in source).
    None,
    /// Boolean (`True` / `False` in source).
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Interned string.
    Str(InternedString),
    /// Immutable list of values.
    List(Arc<[Value]>),
    /// A class object declared by a `class` block.
    Class(Arc<ClassObject>),
}

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn int(value: i64) -> Self {
        Value::Int(value)
    }

    /// Create a float value.
    #[inline]
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a boolean value.
    #[inline]
    pub fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    /// Create a string value from an interned handle.
    #[inline]
    pub fn string(value: InternedString) -> Self {
        Value::Str(value)
    }

    /// Intern `value` and wrap it.
    #[inline]
    pub fn str(value: &str) -> Self {
        Value::Str(intern(value))
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }

    /// Create a class value.
    #[inline]
    pub fn class(class: ClassObject) -> Self {
        Value::Class(Arc::new(class))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    pub fn is_class(&self) -> bool {
        matches!(self, Value::Class(_))
    }

    /// Extract an integer, if this is one.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a boolean, if this is one.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a float, if this is one.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the string contents, if this is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract the list items, if this is a list.
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Extract the class object, if this is a class.
    #[inline]
    pub fn as_class(&self) -> Option<&Arc<ClassObject>> {
        match self {
            Value::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Name of this value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Class(_) => "class",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Class identity, not structure: two declarations are two classes.
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s.as_str()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Class(c) => write!(f, "<class '{}'>", c.qualname()),
        }
    }
}

// =============================================================================
// ClassObject
// =============================================================================

/// A class declared by a module's `class` block.
///
/// Classes are immutable after construction: their attribute table is fixed
/// by the declaration that produced them, so no lock is needed for reads.
#[derive(Debug)]
pub struct ClassObject {
    /// Bare class name (e.g. `Locale`).
    name: InternedString,
    /// Qualified name including the defining module (e.g. `model.locale.Locale`).
    qualname: Arc<str>,
    /// Class-level constant bindings.
    attrs: FxHashMap<InternedString, Value>,
}

impl ClassObject {
    /// Create a class object.
    pub fn new(
        name: InternedString,
        qualname: impl Into<Arc<str>>,
        attrs: FxHashMap<InternedString, Value>,
    ) -> Self {
        Self {
            name,
            qualname: qualname.into(),
            attrs,
        }
    }

    /// Bare class name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified `module.Class` name.
    #[inline]
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Look up a class-level attribute.
    #[inline]
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Check whether the class declares an attribute.
    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// All declared attribute names.
    pub fn attr_names(&self) -> Vec<InternedString> {
        self.attrs.keys().cloned().collect()
    }

    /// Number of declared attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the class body was empty (`pass`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_class() -> ClassObject {
        let mut attrs = FxHashMap::default();
        attrs.insert(intern("KIND"), Value::str("http"));
        attrs.insert(intern("MAX_IDLE"), Value::int(30));
        ClassObject::new(intern("Endpoint"), "net.Endpoint", attrs)
    }

    // =========================================================================
    // Value Tests
    // =========================================================================

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::int(42).as_int(), Some(42));
        assert_eq!(Value::bool(true).as_bool(), Some(true));
        assert_eq!(Value::float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::str("hi").as_str(), Some("hi"));
        assert!(Value::None.is_none());
        assert!(Value::float(0.0).is_float());
    }

    #[test]
    fn test_value_accessor_type_mismatch() {
        assert_eq!(Value::int(1).as_bool(), None);
        assert_eq!(Value::str("1").as_int(), None);
        assert_eq!(Value::None.as_str(), None);
    }

    #[test]
    fn test_value_list() {
        let list = Value::list(vec![Value::int(1), Value::int(2)]);
        let items = list.as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_int(), Some(1));
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::int(3), Value::int(3));
        assert_ne!(Value::int(3), Value::float(3.0));
        assert_eq!(Value::str("a"), Value::str("a"));
        assert_eq!(
            Value::list(vec![Value::None]),
            Value::list(vec![Value::None])
        );
    }

    #[test]
    fn test_class_equality_is_identity() {
        let a = Value::class(sample_class());
        let b = Value::class(sample_class());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::bool(true).to_string(), "True");
        assert_eq!(Value::str("hi").to_string(), "\"hi\"");
        assert_eq!(
            Value::list(vec![Value::int(1), Value::bool(false)]).to_string(),
            "[1, False]"
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::None.type_name(), "NoneType");
        assert_eq!(Value::int(0).type_name(), "int");
        assert_eq!(Value::class(sample_class()).type_name(), "class");
    }

    // =========================================================================
    // ClassObject Tests
    // =========================================================================

    #[test]
    fn test_class_names() {
        let class = sample_class();
        assert_eq!(class.name(), "Endpoint");
        assert_eq!(class.qualname(), "net.Endpoint");
    }

    #[test]
    fn test_class_attr_lookup() {
        let class = sample_class();
        assert_eq!(class.get_attr("KIND").and_then(Value::as_str), Some("http"));
        assert_eq!(class.get_attr("MAX_IDLE").and_then(Value::as_int), Some(30));
        assert!(class.get_attr("ABSENT").is_none());
        assert!(class.has_attr("KIND"));
        assert!(!class.has_attr("kind"));
    }

    #[test]
    fn test_class_attr_names() {
        let class = sample_class();
        let mut names = class.attr_names();
        names.sort();
        let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["KIND", "MAX_IDLE"]);
        assert_eq!(class.len(), 2);
        assert!(!class.is_empty());
    }

    #[test]
    fn test_empty_class() {
        let class = ClassObject::new(intern("Marker"), "m.Marker", FxHashMap::default());
        assert!(class.is_empty());
        assert_eq!(class.len(), 0);
    }
}
