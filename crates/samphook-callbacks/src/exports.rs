//! Export tables and compiled-in extension modules.

use std::collections::HashMap;
use std::sync::Arc;

use samphook_core::result::AppResult;

use crate::hooks::definitions::{CallbackArgs, CallbackName, CallbackResult};
use crate::hooks::registry::CallbackRegistry;
use crate::module::ExtensionModule;
use crate::traits::{CallbackHandler, ClosureHandler};

/// Handlers a module exposes, at most one per callback name.
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    /// Callback name → exported handler.
    handlers: HashMap<CallbackName, Arc<dyn CallbackHandler>>,
}

impl ModuleExports {
    /// Creates an empty export table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler, replacing any previous export of the same name.
    pub fn with_handler(mut self, name: CallbackName, handler: Arc<dyn CallbackHandler>) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    /// Inserts a handler, returning the export it replaced.
    pub fn insert(
        &mut self,
        name: CallbackName,
        handler: Arc<dyn CallbackHandler>,
    ) -> Option<Arc<dyn CallbackHandler>> {
        self.handlers.insert(name, handler)
    }

    /// Looks up the handler exported under `name`.
    pub fn get(&self, name: CallbackName) -> Option<&Arc<dyn CallbackHandler>> {
        self.handlers.get(&name)
    }

    /// Present entries, in [`CallbackName::ALL`] order.
    pub fn present(&self) -> impl Iterator<Item = (CallbackName, &Arc<dyn CallbackHandler>)> {
        CallbackName::ALL
            .iter()
            .filter_map(|name| self.handlers.get(name).map(|handler| (*name, handler)))
    }

    /// Number of exported handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is exported.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

type InitFn = Box<dyn Fn(&CallbackRegistry) -> AppResult<()> + Send + Sync>;

/// An extension module assembled in code rather than loaded from disk.
pub struct StaticModule {
    /// Fully-qualified module name.
    name: String,
    /// Exported handlers.
    exports: ModuleExports,
    /// Optional initialization code.
    init: Option<InitFn>,
}

impl std::fmt::Debug for StaticModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticModule")
            .field("name", &self.name)
            .field("exports", &self.exports.len())
            .field("init", &self.init.as_ref().map(|_| "<closure>"))
            .finish()
    }
}

impl StaticModule {
    /// Starts building a module with the given fully-qualified name.
    pub fn builder(name: &str) -> StaticModuleBuilder {
        StaticModuleBuilder {
            name: name.to_string(),
            exports: ModuleExports::new(),
            init: None,
        }
    }
}

impl ExtensionModule for StaticModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self, registry: &CallbackRegistry) -> AppResult<()> {
        match &self.init {
            Some(init) => init(registry),
            None => Ok(()),
        }
    }

    fn exports(&self) -> ModuleExports {
        self.exports.clone()
    }
}

/// Builder for [`StaticModule`].
pub struct StaticModuleBuilder {
    name: String,
    exports: ModuleExports,
    init: Option<InitFn>,
}

impl StaticModuleBuilder {
    /// Exports a handler under a callback name.
    pub fn on(mut self, name: CallbackName, handler: Arc<dyn CallbackHandler>) -> Self {
        self.exports.insert(name, handler);
        self
    }

    /// Exports a closure under a callback name.
    pub fn on_fn<F>(self, name: CallbackName, handler: F) -> Self
    where
        F: Fn(&CallbackArgs) -> CallbackResult + Send + Sync + 'static,
    {
        let label = format!("{}.{}", self.name, name);
        self.on(name, ClosureHandler::wrap(&label, handler))
    }

    /// Sets the code run when the module is imported.
    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&CallbackRegistry) -> AppResult<()> + Send + Sync + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    /// Builds the module.
    pub fn build(self) -> Arc<StaticModule> {
        Arc::new(StaticModule {
            name: self.name,
            exports: self.exports,
            init: self.init,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::definitions::CallbackAction;

    fn noop() -> Arc<dyn CallbackHandler> {
        ClosureHandler::wrap("noop", |_| Ok(CallbackAction::Continue))
    }

    #[test]
    fn test_present_follows_declaration_order() {
        let exports = ModuleExports::new()
            .with_handler(CallbackName::OnVehicleDeath, noop())
            .with_handler(CallbackName::OnPlayerConnect, noop())
            .with_handler(CallbackName::OnGameModeInit, noop());

        let names: Vec<CallbackName> = exports.present().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                CallbackName::OnGameModeInit,
                CallbackName::OnPlayerConnect,
                CallbackName::OnVehicleDeath,
            ]
        );
    }

    #[test]
    fn test_one_export_per_name() {
        let mut exports = ModuleExports::new();
        assert!(exports.insert(CallbackName::OnVehicleDeath, noop()).is_none());
        assert!(exports.insert(CallbackName::OnVehicleDeath, noop()).is_some());
        assert_eq!(exports.len(), 1);
    }

    #[test]
    fn test_static_module_builder() {
        let module = StaticModule::builder("python.vehicles")
            .on_fn(CallbackName::OnVehicleDeath, |_| Ok(CallbackAction::Continue))
            .build();

        assert_eq!(module.name(), "python.vehicles");
        assert!(module.exports().get(CallbackName::OnVehicleDeath).is_some());
        assert!(module.exports().get(CallbackName::OnVehicleSpawn).is_none());
        assert!(module.init(&CallbackRegistry::new()).is_ok());
    }
}
