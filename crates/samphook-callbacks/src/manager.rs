//! Callback manager: owns the registry, the hooked host module, and the loader.

use std::sync::Arc;

use tracing::info;

use samphook_core::config::callbacks::CallbackConfig;
use samphook_core::error::AppError;
use samphook_core::result::AppResult;

use crate::hooks::definitions::{CallbackArgs, CallbackName, CallbackResult};
use crate::hooks::dispatcher::{HostModule, hook_callbacks};
use crate::hooks::registry::CallbackRegistry;
use crate::loader::{ImportOrderWarning, ModuleLoader};
use crate::module::{ExtensionModule, ModuleTable};

/// Brings up the callback machinery in the required order and exposes it.
#[derive(Debug)]
pub struct CallbackManager {
    /// Observer registry.
    registry: Arc<CallbackRegistry>,
    /// The host's main module, with hooks installed.
    host: HostModule,
    /// Import interceptor.
    loader: ModuleLoader,
}

impl CallbackManager {
    /// Hooks the host's callbacks, then installs the import interceptor.
    ///
    /// `host` must already carry its main handlers and its name must match
    /// the configured main module. `modules` is the table of modules loaded
    /// so far; namespace modules found there produce import-order warnings.
    pub fn start(
        config: &CallbackConfig,
        mut host: HostModule,
        modules: Arc<ModuleTable>,
    ) -> AppResult<Self> {
        if host.name() != config.main_module {
            return Err(AppError::configuration(format!(
                "Host module '{}' does not match configured main module '{}'",
                host.name(),
                config.main_module
            )));
        }

        let registry = Arc::new(CallbackRegistry::new());
        hook_callbacks(&mut host, &registry)?;
        let loader = ModuleLoader::install(Arc::clone(&registry), modules, config);

        info!(
            main_module = %config.main_module,
            namespace = %config.namespace,
            "Callback manager started"
        );

        Ok(Self {
            registry,
            host,
            loader,
        })
    }

    /// Fires a callback on the host module, as the host runtime would.
    pub fn fire(&self, name: CallbackName, args: &CallbackArgs) -> CallbackResult {
        self.host.invoke(name, args)
    }

    /// Imports an extension module through the interceptor.
    pub fn import(&self, module: Arc<dyn ExtensionModule>) -> AppResult<Arc<dyn ExtensionModule>> {
        self.loader.import(module)
    }

    /// Revokes every observer owned by `group`.
    pub fn unregister(&self, group: &str) -> AppResult<usize> {
        self.registry.unregister(group)
    }

    /// Returns the observer registry.
    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Returns the hooked host module.
    pub fn host(&self) -> &HostModule {
        &self.host
    }

    /// Returns the import interceptor.
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Returns the warnings issued when the interceptor was installed.
    pub fn warnings(&self) -> &[ImportOrderWarning] {
        self.loader.warnings()
    }
}
