//! Process-wide namespace → attribute → callable table.
//!
//! # Thread Safety
//!
//! Each namespace maps to an `Arc<NamespaceEntry>` that is never mutated
//! after construction. Registration builds a complete new entry outside the
//! lock and swaps it in under a short write lock, so concurrent lookups see
//! either the old table or the new one, never a mix.

use super::UnitLoader;
use crate::error::{RpcError, Result};
use crate::unit::help::{render_binding, render_unit};
use crate::unit::{Function, Unit};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Immutable snapshot of one registered namespace.
#[derive(Debug)]
pub struct NamespaceEntry {
    unit: Arc<Unit>,
    functions: BTreeMap<String, Arc<Function>>,
    unit_help: String,
    binding_help: HashMap<String, String>,
}

impl NamespaceEntry {
    fn build(unit: Unit) -> Self {
        let mut functions = BTreeMap::new();
        let mut binding_help = HashMap::new();

        for (name, binding) in unit.bindings() {
            binding_help.insert(name.to_string(), render_binding(unit.name(), name, binding));
            match binding.as_plain_callable() {
                Some(function) => {
                    functions.insert(name.to_string(), function.clone());
                }
                None => debug!(
                    "Skipping {} binding {}.{}: not a plain callable",
                    binding.kind_label(),
                    unit.name(),
                    name
                ),
            }
        }

        Self {
            unit_help: render_unit(&unit),
            unit: Arc::new(unit),
            functions,
            binding_help,
        }
    }

    pub fn name(&self) -> &str {
        self.unit.name()
    }

    /// The loaded unit, including bindings that are not dispatched.
    pub fn unit(&self) -> &Arc<Unit> {
        &self.unit
    }

    /// Exposed attribute names, sorted.
    pub fn attributes(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    pub fn function(&self, attr: &str) -> Option<&Arc<Function>> {
        self.functions.get(attr)
    }

    /// Documentation for the whole unit.
    pub fn help(&self) -> &str {
        &self.unit_help
    }

    /// Documentation for any binding of the unit, dispatched or not.
    pub fn help_on(&self, attr: &str) -> Option<&str> {
        self.binding_help.get(attr).map(String::as_str)
    }
}

/// Registry of dispatchable namespaces.
///
/// Constructed once at startup and shared (via `Arc`) with every request
/// handler.
pub struct DispatchRegistry {
    loader: Arc<dyn UnitLoader>,
    namespaces: RwLock<HashMap<String, Arc<NamespaceEntry>>>,
}

impl DispatchRegistry {
    pub fn new<L: UnitLoader + 'static>(loader: L) -> Self {
        Self::with_loader(Arc::new(loader))
    }

    pub fn with_loader(loader: Arc<dyn UnitLoader>) -> Self {
        Self {
            loader,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Load the unit called `name` and expose its plain callables under the
    /// namespace `name`.
    ///
    /// Re-registering replaces the namespace's attribute set; nothing from
    /// the previous registration survives.
    pub fn register(&self, name: &str) -> Result<()> {
        let unit = self
            .loader
            .load(name)
            .ok_or_else(|| RpcError::UnitNotFound {
                name: name.to_string(),
            })?;
        self.install(name.to_string(), unit.renamed(name));
        Ok(())
    }

    /// Register an already-built unit under its own name.
    pub fn register_unit(&self, unit: Unit) {
        self.install(unit.name().to_string(), unit);
    }

    fn install(&self, namespace: String, unit: Unit) {
        let entry = Arc::new(NamespaceEntry::build(unit));
        info!(
            "Registered namespace {} ({} attributes)",
            namespace,
            entry.functions.len()
        );

        let mut namespaces = self
            .namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        namespaces.insert(namespace, entry);
    }

    /// Snapshot of a registered namespace.
    pub fn namespace(&self, namespace: &str) -> Result<Arc<NamespaceEntry>> {
        self.namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .cloned()
            .ok_or_else(|| RpcError::NamespaceNotFound {
                namespace: namespace.to_string(),
            })
    }

    /// Resolve `(namespace, attr)` to its callable.
    pub fn resolve(&self, namespace: &str, attr: &str) -> Result<Arc<Function>> {
        let entry = self.namespace(namespace)?;
        entry
            .function(attr)
            .cloned()
            .ok_or_else(|| RpcError::AttributeNotFound {
                namespace: namespace.to_string(),
                attr: attr.to_string(),
            })
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(namespace)
    }

    /// Registered namespace names, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Units the loader could register.
    pub fn available(&self) -> Vec<String> {
        self.loader.available()
    }
}

impl std::fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::UnitCatalog;
    use crate::unit::{ClassInfo, Signature};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn constant(name: &str, value: i64) -> Function {
        Function::new(name, Signature::new(), move |_| Ok(json!(value)))
    }

    fn catalog() -> UnitCatalog {
        UnitCatalog::new().with("tools", || {
            Unit::new("tools")
                .function(constant("zeta", 1))
                .function(constant("alpha", 2))
                .class(ClassInfo::new("Widget"))
                .method("bound", "Widget()", constant("run", 3))
                .constant("VERSION", "1.0")
        })
    }

    #[test]
    fn test_register_exposes_only_plain_callables() {
        let registry = DispatchRegistry::new(catalog());
        registry.register("tools").unwrap();

        let entry = registry.namespace("tools").unwrap();
        assert_eq!(entry.attributes(), vec!["alpha", "zeta"]);
        assert!(registry.resolve("tools", "Widget").is_err());
        assert!(registry.resolve("tools", "bound").is_err());
        assert!(registry.resolve("tools", "VERSION").is_err());

        // Non-callables are still documented.
        assert!(entry.help_on("VERSION").is_some());
        assert!(entry.help().contains("class Widget"));
    }

    #[test]
    fn test_resolve_errors() {
        let registry = DispatchRegistry::new(catalog());
        registry.register("tools").unwrap();

        let err = registry.resolve("nope", "alpha").unwrap_err();
        assert_eq!(err.to_string(), "No module named 'nope'");

        let err = registry.resolve("tools", "missing").unwrap_err();
        assert_eq!(err.to_string(), "Module tools has no attribute 'missing'");
    }

    #[test]
    fn test_register_unknown_unit() {
        let registry = DispatchRegistry::new(catalog());
        let err = registry.register("ghost").unwrap_err();
        assert!(matches!(err, RpcError::UnitNotFound { .. }));
        assert!(registry.namespaces().is_empty());
    }

    #[test]
    fn test_reregistration_replaces_rather_than_merges() {
        let generation = Arc::new(AtomicUsize::new(0));
        let counter = generation.clone();
        let catalog = UnitCatalog::new().with("live", move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Unit::new("live").function(constant("old", 1)),
                _ => Unit::new("live").function(constant("new", 2)),
            }
        });

        let registry = DispatchRegistry::new(catalog);
        registry.register("live").unwrap();
        let before = registry.namespace("live").unwrap();

        registry.register("live").unwrap();
        let after = registry.namespace("live").unwrap();

        assert_eq!(after.attributes(), vec!["new"]);
        assert!(registry.resolve("live", "old").is_err());
        // Snapshots taken earlier are unaffected.
        assert_eq!(before.attributes(), vec!["old"]);
    }

    #[test]
    fn test_register_unit_directly() {
        let registry = DispatchRegistry::new(UnitCatalog::new());
        registry.register_unit(Unit::new("inline").function(constant("one", 1)));

        assert!(registry.contains("inline"));
        let function = registry.resolve("inline", "one").unwrap();
        assert_eq!(function.invoke(vec![], Default::default()), Ok(json!(1)));
    }

    #[test]
    fn test_concurrent_reads_during_registration() {
        let registry = Arc::new(DispatchRegistry::new(catalog()));
        registry.register("tools").unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let entry = registry.namespace("tools").unwrap();
                        assert_eq!(entry.attributes(), vec!["alpha", "zeta"]);
                        let value: Value = entry
                            .function("alpha")
                            .unwrap()
                            .invoke(vec![], Default::default())
                            .unwrap();
                        assert_eq!(value, json!(2));
                    }
                })
            })
            .collect();

        for _ in 0..50 {
            registry.register("tools").unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
