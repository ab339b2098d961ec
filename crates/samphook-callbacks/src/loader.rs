//! Module import interceptor.
//!
//! Modules imported through [`ModuleLoader`] whose name falls under the
//! designated namespace are scanned once they finish initializing: each
//! export keyed by a recognized callback name becomes an observer owned by
//! the module. Modules outside the namespace load normally and are never
//! scanned.

use std::sync::Arc;

use tracing::{debug, info, warn};

use samphook_core::config::callbacks::CallbackConfig;
use samphook_core::error::AppError;
use samphook_core::result::AppResult;

use crate::hooks::registry::CallbackRegistry;
use crate::module::{ExtensionModule, ModuleTable};

/// Issued at install time for each namespace module that was already loaded
/// and therefore never scanned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Module {module} was imported before samphook, this is probably not what you want.")]
pub struct ImportOrderWarning {
    /// The module that was loaded too early.
    pub module: String,
}

/// Imports extension modules and auto-registers their callbacks.
#[derive(Debug)]
pub struct ModuleLoader {
    /// Registry receiving auto-registered observers.
    registry: Arc<CallbackRegistry>,
    /// Table of loaded modules.
    modules: Arc<ModuleTable>,
    /// Prefix a module name must start with to be scanned.
    prefix: String,
    /// Warnings issued when the loader was installed.
    warnings: Vec<ImportOrderWarning>,
}

impl ModuleLoader {
    /// Installs the interceptor over an existing module table.
    ///
    /// Every module already in the table under the namespace produces an
    /// [`ImportOrderWarning`]. Nothing is registered retroactively.
    pub fn install(
        registry: Arc<CallbackRegistry>,
        modules: Arc<ModuleTable>,
        config: &CallbackConfig,
    ) -> Self {
        let prefix = config.namespace_prefix();

        let warnings: Vec<ImportOrderWarning> = modules
            .names_with_prefix(&prefix)
            .into_iter()
            .map(|module| ImportOrderWarning { module })
            .collect();

        for warning in &warnings {
            warn!(module = %warning.module, "{}", warning);
        }

        info!(
            namespace = %config.namespace,
            preloaded = warnings.len(),
            "Module import interceptor installed"
        );

        Self {
            registry,
            modules,
            prefix,
            warnings,
        }
    }

    /// Imports a module.
    ///
    /// Importing a name that is already loaded returns the loaded module
    /// without running anything. For a namespace module, the module is marked
    /// as loading while its init code runs, then its exports are registered
    /// under its name. If init or registration fails the module stays
    /// unloaded and whatever it registered during this import is revoked.
    pub fn import(&self, module: Arc<dyn ExtensionModule>) -> AppResult<Arc<dyn ExtensionModule>> {
        let name = module.name().to_string();

        if let Some(loaded) = self.modules.get(&name) {
            debug!(module = %name, "Module already loaded");
            return Ok(loaded);
        }

        if !self.in_namespace(&name) {
            module.init(&self.registry)?;
            self.modules.insert(Arc::clone(&module));
            debug!(module = %name, "Module loaded outside namespace");
            return Ok(module);
        }

        let owned_before = self.registry.group_count(&name);
        let result = {
            let _loading = self.registry.begin_module_load(&name);
            module
                .init(&self.registry)
                .and_then(|()| self.registry.register_exports(&name, &module.exports()))
        };

        match result {
            Ok(count) => {
                self.modules.insert(Arc::clone(&module));
                info!(module = %name, callbacks = count, "Module imported");
                Ok(module)
            }
            Err(e) => {
                let revoked = self.registry.truncate_group(&name, owned_before);
                warn!(module = %name, error = %e, revoked, "Module import failed");
                Err(e)
            }
        }
    }

    /// Unloads a module and revokes every observer it owns.
    ///
    /// Returns how many observers were revoked. Fails with not-found if the
    /// module is not loaded.
    pub fn unload(&self, name: &str) -> AppResult<usize> {
        self.modules
            .remove(name)
            .ok_or_else(|| AppError::not_found(format!("Module '{name}' is not loaded")))?;

        let revoked = match self.registry.unregister(name) {
            Ok(count) => count,
            Err(e) if e.is_not_found() => 0,
            Err(e) => return Err(e),
        };

        info!(module = %name, callbacks = revoked, "Module unloaded");
        Ok(revoked)
    }

    /// Unloads the module's current version (if loaded) and imports `module`.
    pub fn reload(&self, module: Arc<dyn ExtensionModule>) -> AppResult<Arc<dyn ExtensionModule>> {
        let name = module.name().to_string();
        if self.modules.contains(&name) {
            self.unload(&name)?;
        }
        self.import(module)
    }

    /// Returns whether a module name falls under the designated namespace.
    pub fn in_namespace(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    /// Returns the warnings issued at install time.
    pub fn warnings(&self) -> &[ImportOrderWarning] {
        &self.warnings
    }

    /// Returns the registry observers are registered in.
    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Returns the table of loaded modules.
    pub fn modules(&self) -> &Arc<ModuleTable> {
        &self.modules
    }
}
