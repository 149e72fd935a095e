//! Module execution: the seam between locating source and having a
//! namespace.
//!
//! The resolver treats execution as a black box behind [`ModuleExecutor`]:
//! something that takes source text and populates a module-like object.
//! [`SourceExecutor`] is the shipped implementation for the `.lode` format;
//! embedders substitute their own to load other formats (or to instrument
//! loading in tests).

use std::fmt;
use std::sync::Arc;

use lodestar_core::{ClassObject, Value};
use lodestar_parser::{parse, ParseError, Stmt};
use rustc_hash::FxHashMap;

use crate::module_object::ModuleObject;

// =============================================================================
// ModuleExecutor
// =============================================================================

/// Executes module source text into a module namespace.
///
/// Implementations must be infallible on re-entry concerns: the registry
/// holds its lock across `execute`, so an executor must not load modules
/// through the same registry from inside `execute`.
pub trait ModuleExecutor: Send + Sync {
    /// Execute `source`, binding the resulting attributes on `module`.
    fn execute(&self, source: &str, module: &ModuleObject) -> Result<(), ExecError>;
}

// =============================================================================
// ExecError
// =============================================================================

/// An error produced while executing module source.
#[derive(Debug, Clone)]
pub enum ExecError {
    /// The source failed to parse; position details live on the inner error.
    Parse(ParseError),
    /// Executor-specific failure (unreadable source, custom executor
    /// errors, ...).
    Failed { message: Arc<str> },
}

impl ExecError {
    pub fn failed(message: impl Into<Arc<str>>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{}", err),
            Self::Failed { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Failed { .. } => None,
        }
    }
}

impl From<ParseError> for ExecError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

// =============================================================================
// SourceExecutor
// =============================================================================

/// Default executor: parses `.lode` source and folds its statements into
/// the module, in source order (rebinding allowed, last write wins).
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceExecutor;

impl ModuleExecutor for SourceExecutor {
    fn execute(&self, source: &str, module: &ModuleObject) -> Result<(), ExecError> {
        let parsed = parse(source)?;

        if let Some(doc) = &parsed.doc {
            module.set_attr("__doc__", Value::str(doc));
        }

        for stmt in &parsed.stmts {
            match stmt {
                Stmt::Assign { name, value } => {
                    module.set_attr_interned(name.clone(), value.clone());
                }
                Stmt::ClassDef { name, members } => {
                    let qualname = format!("{}.{}", module.name(), name);
                    let mut attrs = FxHashMap::default();
                    for (member, value) in members {
                        attrs.insert(member.clone(), value.clone());
                    }
                    let class = ClassObject::new(name.clone(), qualname, attrs);
                    module.set_attr_interned(name.clone(), Value::class(class));
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_bindings() {
        let module = ModuleObject::new("config");
        SourceExecutor
            .execute("RETRIES = 3\nNAME = \"lodestar\"\n", &module)
            .unwrap();

        assert_eq!(module.get_attr("RETRIES").and_then(|v| v.as_int()), Some(3));
        assert_eq!(
            module.get_attr("NAME").and_then(|v| v.as_str().map(String::from)),
            Some("lodestar".to_string())
        );
    }

    #[test]
    fn test_execute_docstring() {
        let module = ModuleObject::new("doc_mod");
        SourceExecutor
            .execute("\"\"\"Helpful docs.\"\"\"\nX = 1\n", &module)
            .unwrap();
        assert_eq!(module.doc().as_deref(), Some("Helpful docs."));
    }

    #[test]
    fn test_execute_class_qualname() {
        let module = ModuleObject::new("model.locale");
        SourceExecutor
            .execute("class Locale:\n    DEFAULT = \"eng\"\n", &module)
            .unwrap();

        let class = module
            .get_attr("Locale")
            .and_then(|v| v.as_class().cloned())
            .expect("class should be bound");
        assert_eq!(class.name(), "Locale");
        assert_eq!(class.qualname(), "model.locale.Locale");
        assert_eq!(
            class.get_attr("DEFAULT").and_then(Value::as_str),
            Some("eng")
        );
    }

    #[test]
    fn test_execute_last_write_wins() {
        let module = ModuleObject::new("rebind");
        SourceExecutor.execute("X = 1\nX = 2\n", &module).unwrap();
        assert_eq!(module.get_attr("X").and_then(|v| v.as_int()), Some(2));
    }

    #[test]
    fn test_execute_parse_error_wrapped() {
        let module = ModuleObject::new("broken");
        let err = SourceExecutor
            .execute("X = \"unterminated\n", &module)
            .unwrap_err();
        match err {
            ExecError::Parse(parse_err) => assert_eq!(parse_err.line, 1),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_exec_error_display_and_source() {
        use std::error::Error;

        let module = ModuleObject::new("broken");
        let err = SourceExecutor.execute("X = ?\n", &module).unwrap_err();
        assert!(err.to_string().contains("SyntaxError"));
        assert!(err.source().is_some());

        let failed = ExecError::failed("engine offline");
        assert_eq!(failed.to_string(), "engine offline");
        assert!(failed.source().is_none());
    }
}
