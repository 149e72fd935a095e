//! Integration tests for the resolution pipeline.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lodestar_core::Value;
use lodestar_resolver::{
    AmbiguityPolicy, ExecError, ModuleExecutor, ModuleObject, ModuleRegistry, ResolveError,
    Resolver, ResolverConfig, SourceExecutor,
};

// =============================================================================
// Fixtures
// =============================================================================

fn fixture(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("lodestar_it_{}", name));
    let _ = fs::remove_dir_all(&root);
    let _ = fs::create_dir_all(&root);
    root
}

/// Executor that counts executions before delegating to the real one.
#[derive(Default)]
struct CountingExecutor {
    inner: SourceExecutor,
    executions: AtomicUsize,
}

impl CountingExecutor {
    fn count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl ModuleExecutor for CountingExecutor {
    fn execute(&self, source: &str, module: &ModuleObject) -> Result<(), ExecError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(source, module)
    }
}

fn counting_resolver() -> (Resolver, Arc<CountingExecutor>) {
    let executor = Arc::new(CountingExecutor::default());
    let resolver = Resolver::with_parts(
        ResolverConfig::default(),
        Arc::new(ModuleRegistry::new()),
        Arc::clone(&executor) as Arc<dyn ModuleExecutor>,
    );
    (resolver, executor)
}

// =============================================================================
// End-to-End Workflow
// =============================================================================

#[test]
fn test_end_to_end_resolution_workflow() {
    let root = fixture("workflow");
    let model = root.join("model");
    let _ = fs::create_dir_all(&model);
    let _ = fs::write(model.join("__init__.lode"), "# model package\nVERSION = 1\n");
    let _ = fs::write(
        model.join("locale.lode"),
        "\"\"\"Locale model.\"\"\"\n\nDEFAULT_TAG = \"eng\"\n\nclass Locale:\n    SEPARATOR = \"-\"\n",
    );

    let resolver = Resolver::new();

    // 1. Load a module inside a package.
    let locale = resolver.load_module(&root, "model.locale").unwrap();
    assert_eq!(locale.name(), "model.locale");
    assert_eq!(locale.package(), Some("model"));
    assert_eq!(locale.doc().as_deref(), Some("Locale model."));

    // 2. Extract a plain attribute and a class.
    let tag = resolver.attribute(&locale, "DEFAULT_TAG").unwrap();
    assert_eq!(tag.as_str(), Some("eng"));

    let class = resolver.load_class(&root, "model.locale.Locale").unwrap();
    let class = class.as_class().expect("Locale should be a class");
    assert_eq!(class.qualname(), "model.locale.Locale");
    assert_eq!(class.get_attr("SEPARATOR").and_then(Value::as_str), Some("-"));

    // 3. The second load is the cached handle.
    let again = resolver.load_module(&root, "model.locale").unwrap();
    assert!(Arc::ptr_eq(&locale, &again));

    // 4. The package loaded independently.
    let package = resolver.load_module(&root, "model").unwrap();
    assert_eq!(package.get_attr("VERSION").and_then(|v| v.as_int()), Some(1));

    let _ = fs::remove_dir_all(root);
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_load_is_idempotent_and_executes_once() {
    let root = fixture("idempotent");
    let _ = fs::write(root.join("counted.lode"), "X = 1\n");

    let (resolver, executor) = counting_resolver();

    let first = resolver.load_module(&root, "counted").unwrap();
    let second = resolver.load_module(&root, "counted").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(executor.count(), 1);

    // Slash and dotted spellings share the cache entry.
    let slashed = resolver.load_module(&root, "counted").unwrap();
    assert!(Arc::ptr_eq(&first, &slashed));
    assert_eq!(executor.count(), 1);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn test_dotted_and_slash_references_share_cache() {
    let root = fixture("spellings");
    let sub = root.join("pkg");
    let _ = fs::create_dir_all(&sub);
    let _ = fs::write(sub.join("mod.lode"), "X = 1\n");

    let (resolver, executor) = counting_resolver();

    let dotted = resolver.load_module(&root, "pkg.mod").unwrap();
    let slashed = resolver.load_module(&root, "pkg/mod").unwrap();

    assert!(Arc::ptr_eq(&dotted, &slashed));
    assert_eq!(executor.count(), 1);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn test_reload_after_remove_is_fresh() {
    let root = fixture("reload");
    let _ = fs::write(root.join("fresh.lode"), "X = 1\n");

    let resolver = Resolver::new();
    let first = resolver.load_module(&root, "fresh").unwrap();

    resolver.registry().remove("fresh");
    let second = resolver.load_module(&root, "fresh").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));

    let _ = fs::remove_dir_all(root);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_loads_execute_once() {
    use std::thread;

    let root = fixture("concurrent");
    let _ = fs::write(root.join("raced.lode"), "SIDE_EFFECT = 1\n");

    let (resolver, executor) = counting_resolver();
    let resolver = Arc::new(resolver);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let root = root.clone();
            thread::spawn(move || resolver.load_module(&root, "raced").unwrap())
        })
        .collect();

    let modules: Vec<Arc<ModuleObject>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Module-level execution happened exactly once; all callers share the
    // same handle.
    assert_eq!(executor.count(), 1);
    for module in &modules[1..] {
        assert!(Arc::ptr_eq(&modules[0], module));
    }

    let _ = fs::remove_dir_all(root);
}

// =============================================================================
// Injection
// =============================================================================

#[test]
fn test_custom_module_injection() {
    let root = fixture("injection");

    let resolver = Resolver::new();

    // Create and inject a module that has no file behind it.
    let custom = Arc::new(ModuleObject::new("myapp.config"));
    custom.set_attr("DEBUG", Value::bool(true));
    custom.set_attr("PORT", Value::int(8080));
    resolver.registry().insert("myapp.config", Arc::clone(&custom));

    // Loading finds the injected module without touching the filesystem.
    let imported = resolver.load_module(&root, "myapp.config").unwrap();
    assert!(Arc::ptr_eq(&imported, &custom));

    let debug = resolver.attribute(&imported, "DEBUG").unwrap();
    assert_eq!(debug.as_bool(), Some(true));

    let port = resolver.attribute(&imported, "PORT").unwrap();
    assert_eq!(port.as_int(), Some(8080));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn test_shared_registry_across_resolvers() {
    let root = fixture("shared_registry");
    let _ = fs::write(root.join("shared.lode"), "X = 1\n");

    let registry = Arc::new(ModuleRegistry::new());
    let a = Resolver::with_parts(
        ResolverConfig::default(),
        Arc::clone(&registry),
        Arc::new(SourceExecutor),
    );
    let b = Resolver::with_parts(
        ResolverConfig::default(),
        Arc::clone(&registry),
        Arc::new(SourceExecutor),
    );

    let from_a = a.load_module(&root, "shared").unwrap();
    let from_b = b.load_module(&root, "shared").unwrap();
    assert!(Arc::ptr_eq(&from_a, &from_b));

    let _ = fs::remove_dir_all(root);
}

// =============================================================================
// Failure Modes
// =============================================================================

#[test]
fn test_not_found_correctness() {
    let root = fixture("not_found");
    let sub = root.join("b");
    let _ = fs::create_dir_all(&sub);
    let _ = fs::write(root.join("a.lode"), "X = 1\n");
    let _ = fs::write(sub.join("c.lode"), "X = 1\n");

    let resolver = Resolver::new();
    match resolver.load_module(&root, "x") {
        Err(ResolveError::NotFound { reference, .. }) => assert_eq!(reference.as_ref(), "x"),
        other => panic!("expected NotFound, got {:?}", other),
    }

    // The exact sibling references still resolve.
    assert!(resolver.load_module(&root, "a").is_ok());
    assert!(resolver.load_module(&root, "b/c").is_ok());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn test_recursive_search_determinism() {
    let root = fixture("determinism");
    for dir in ["z", "a"] {
        let sub = root.join(dir);
        let _ = fs::create_dir_all(&sub);
        let _ = fs::write(sub.join("target.lode"), "WHERE = \"{}\"\n".replace("{}", dir));
    }

    // Same winner on every run: the lexicographically first directory.
    for _ in 0..5 {
        let resolver = Resolver::new();
        let module = resolver.load_module(&root, "target").unwrap();
        let place = module.get_attr("WHERE").unwrap();
        assert_eq!(place.as_str(), Some("a"));
    }

    // Strict mode reports the ambiguity instead.
    let strict = Resolver::with_config(ResolverConfig {
        ambiguity: AmbiguityPolicy::Strict,
        ..Default::default()
    });
    match strict.load_module(&root, "target") {
        Err(ResolveError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
        other => panic!("expected Ambiguous, got {:?}", other),
    }

    let _ = fs::remove_dir_all(root);
}

#[test]
fn test_attribute_extraction_and_missing() {
    let root = fixture("attributes");
    let _ = fs::write(root.join("shapes.lode"), "class Foo:\n    pass\n");

    let resolver = Resolver::new();
    let module = resolver.load_module(&root, "shapes").unwrap();

    let foo = resolver.attribute(&module, "Foo").unwrap();
    assert!(foo.is_class());

    match resolver.attribute(&module, "Bar") {
        Err(ResolveError::AttributeMissing { module, attribute }) => {
            assert_eq!(module.as_ref(), "shapes");
            assert_eq!(attribute.as_ref(), "Bar");
        }
        other => panic!("expected AttributeMissing, got {:?}", other),
    }

    let _ = fs::remove_dir_all(root);
}

#[test]
fn test_load_failure_preserves_parse_error() {
    let root = fixture("load_failure");
    let _ = fs::write(root.join("broken.lode"), "GOOD = 1\nBAD = \"unterminated\n");

    let resolver = Resolver::new();
    match resolver.load_module(&root, "broken") {
        Err(ResolveError::LoadFailed { module, cause, .. }) => {
            assert_eq!(module.as_ref(), "broken");
            match cause {
                ExecError::Parse(parse_err) => {
                    assert_eq!(parse_err.line, 2);
                    assert!(parse_err.message.contains("unterminated string"));
                }
                other => panic!("expected Parse cause, got {:?}", other),
            }
        }
        other => panic!("expected LoadFailed, got {:?}", other),
    }

    // A failed load is not cached; fixing the file makes it loadable.
    let _ = fs::write(root.join("broken.lode"), "GOOD = 1\nBAD = \"fixed\"\n");
    assert!(resolver.load_module(&root, "broken").is_ok());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn test_load_failure_source_chain() {
    use std::error::Error;

    let root = fixture("error_chain");
    let _ = fs::write(root.join("bad.lode"), "X = ?\n");

    let resolver = Resolver::new();
    let err = resolver.load_module(&root, "bad").unwrap_err();

    // ResolveError -> ExecError -> ParseError, all reachable.
    let exec = err.source().expect("LoadFailed should chain its cause");
    let parse = exec.source().expect("ExecError::Parse should chain");
    assert!(parse.to_string().contains("line 1"));

    let _ = fs::remove_dir_all(root);
}
