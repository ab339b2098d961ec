//! Extension modules and the table of loaded modules.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use samphook_core::result::AppResult;

use crate::exports::ModuleExports;
use crate::hooks::registry::CallbackRegistry;

/// A unit of extension code that can be imported into the runtime.
///
/// The export table plays the role of the module's top-level attributes:
/// every entry keyed by a recognized callback name is picked up by the
/// import interceptor when the module lives in the designated namespace.
pub trait ExtensionModule: Send + Sync + std::fmt::Debug {
    /// Fully-qualified module name, e.g. `python.vehicles`.
    fn name(&self) -> &str;

    /// Runs the module's initialization code.
    ///
    /// While this runs inside the import interceptor, the module is marked as
    /// the one being loaded, so `registry.register(.., None)` resolves to it.
    fn init(&self, _registry: &CallbackRegistry) -> AppResult<()> {
        Ok(())
    }

    /// Returns the handlers this module exports, keyed by callback name.
    fn exports(&self) -> ModuleExports;
}

/// Table of loaded modules, keyed by fully-qualified name.
#[derive(Debug, Default)]
pub struct ModuleTable {
    /// Module name → module instance.
    modules: RwLock<HashMap<String, Arc<dyn ExtensionModule>>>,
}

impl ModuleTable {
    /// Creates an empty module table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a loaded module, returning the entry it replaced.
    ///
    /// Recording a module directly bypasses the import interceptor, which is
    /// how modules end up loaded without having been scanned.
    pub fn insert(&self, module: Arc<dyn ExtensionModule>) -> Option<Arc<dyn ExtensionModule>> {
        let name = module.name().to_string();
        debug!(module = %name, "Module recorded as loaded");
        self.modules.write().insert(name, module)
    }

    /// Removes a module by name.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn ExtensionModule>> {
        self.modules.write().remove(name)
    }

    /// Gets a module by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ExtensionModule>> {
        self.modules.read().get(name).cloned()
    }

    /// Checks whether a module is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// Returns every loaded module name, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the sorted names of loaded modules starting with `prefix`.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .modules
            .read()
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Returns the number of loaded modules.
    pub fn count(&self) -> usize {
        self.modules.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exports::StaticModule;

    #[derive(Debug)]
    struct ExportsOnly;

    impl ExtensionModule for ExportsOnly {
        fn name(&self) -> &str {
            "python.exports_only"
        }

        fn exports(&self) -> ModuleExports {
            ModuleExports::new()
        }
    }

    #[test]
    fn test_default_init_registers_nothing() {
        let registry = CallbackRegistry::new();
        ExportsOnly.init(&registry).unwrap();
        assert!(registry.groups().is_empty());
    }

    #[test]
    fn test_insert_and_lookup() {
        let table = ModuleTable::new();
        assert!(table.insert(StaticModule::builder("python.vehicles").build()).is_none());

        assert!(table.contains("python.vehicles"));
        assert_eq!(table.count(), 1);
        assert_eq!(
            table.get("python.vehicles").map(|m| m.name().to_string()),
            Some("python.vehicles".to_string())
        );
    }

    #[test]
    fn test_insert_replaces_existing() {
        let table = ModuleTable::new();
        table.insert(StaticModule::builder("python.vehicles").build());
        let previous = table.insert(StaticModule::builder("python.vehicles").build());
        assert!(previous.is_some());
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn test_names_with_prefix_is_sorted_and_filtered() {
        let table = ModuleTable::new();
        for name in ["python.zones", "json", "python.admin", "pythonic"] {
            table.insert(StaticModule::builder(name).build());
        }

        assert_eq!(
            table.names_with_prefix("python."),
            vec!["python.admin".to_string(), "python.zones".to_string()]
        );
        assert_eq!(table.names().len(), 4);
    }

    #[test]
    fn test_remove() {
        let table = ModuleTable::new();
        table.insert(StaticModule::builder("python.vehicles").build());
        assert!(table.remove("python.vehicles").is_some());
        assert!(table.remove("python.vehicles").is_none());
        assert!(!table.contains("python.vehicles"));
    }
}
