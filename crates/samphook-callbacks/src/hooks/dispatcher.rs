//! Hooked callbacks: wrappers installed over the host's entry points.
//!
//! A hooked callback gives the host module's original handler first refusal:
//! - The main handler (if any) runs first.
//! - If it returns `Suppress`, the registry is not consulted for that call.
//! - Otherwise the call fans out to every registered observer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use samphook_core::error::AppError;
use samphook_core::result::AppResult;

use super::definitions::{CallbackAction, CallbackArgs, CallbackName, CallbackResult, DispatchOutcome};
use super::registry::CallbackRegistry;
use crate::traits::CallbackHandler;

/// Wrapper chaining a main handler and registry dispatch for one callback.
#[derive(Debug)]
pub struct HookedCallback {
    /// The callback this wrapper stands in for.
    name: CallbackName,
    /// The host module's original handler, if one was defined.
    main: Option<Arc<dyn CallbackHandler>>,
    /// Registry holding the observers.
    registry: Arc<CallbackRegistry>,
}

impl HookedCallback {
    /// Creates a hooked callback.
    pub fn new(
        name: CallbackName,
        main: Option<Arc<dyn CallbackHandler>>,
        registry: Arc<CallbackRegistry>,
    ) -> Self {
        Self {
            name,
            main,
            registry,
        }
    }

    /// Runs the main handler, then the registered observers.
    ///
    /// Returns `None` when the main handler suppressed the call, otherwise the
    /// outcome of the registry dispatch.
    pub fn call(&self, args: &CallbackArgs) -> AppResult<Option<DispatchOutcome>> {
        if let Some(main) = &self.main {
            if main.handle(args)?.is_suppress() {
                debug!(callback = %self.name, "Main handler suppressed dispatch");
                return Ok(None);
            }
        }

        self.registry.dispatch(self.name, args).map(Some)
    }

    /// Returns the callback this wrapper stands in for.
    pub fn name(&self) -> CallbackName {
        self.name
    }

    /// Returns whether the host module defined a handler before hooking.
    pub fn has_main_handler(&self) -> bool {
        self.main.is_some()
    }
}

impl CallbackHandler for HookedCallback {
    /// The host ignores the wrapper's own result, so this always continues.
    fn handle(&self, args: &CallbackArgs) -> CallbackResult {
        self.call(args)?;
        Ok(CallbackAction::Continue)
    }
}

/// An entry point exposed by the host module.
#[derive(Debug, Clone)]
enum EntryPoint {
    /// A handler defined by host/user code.
    Raw(Arc<dyn CallbackHandler>),
    /// A hooked wrapper.
    Hooked(Arc<HookedCallback>),
}

/// The host's main event module: a named table of entry points.
///
/// The host runtime fires callbacks by name through [`HostModule::invoke`].
#[derive(Debug)]
pub struct HostModule {
    /// Module name.
    name: String,
    /// Callback name → entry point.
    entry_points: HashMap<CallbackName, EntryPoint>,
    /// Whether hooks have been installed.
    hooked: bool,
}

impl HostModule {
    /// Creates a host module with no entry points.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entry_points: HashMap::new(),
            hooked: false,
        }
    }

    /// Defines the main handler for a callback.
    ///
    /// Must happen before hooks are installed; afterwards the entry points
    /// belong to the hooked wrappers.
    pub fn define(&mut self, name: CallbackName, handler: Arc<dyn CallbackHandler>) -> AppResult<()> {
        if self.hooked {
            return Err(AppError::conflict(format!(
                "Cannot define '{name}' on module '{}' after hooks were installed",
                self.name
            )));
        }
        self.entry_points.insert(name, EntryPoint::Raw(handler));
        Ok(())
    }

    /// Fires a callback the way the host runtime does.
    ///
    /// A callback with no entry point is a no-op.
    pub fn invoke(&self, name: CallbackName, args: &CallbackArgs) -> CallbackResult {
        match self.entry_points.get(&name) {
            Some(EntryPoint::Raw(handler)) => handler.handle(args),
            Some(EntryPoint::Hooked(hooked)) => hooked.handle(args),
            None => Ok(CallbackAction::Continue),
        }
    }

    /// Returns the hooked wrapper for a callback, once hooks are installed.
    pub fn hooked(&self, name: CallbackName) -> Option<Arc<HookedCallback>> {
        match self.entry_points.get(&name) {
            Some(EntryPoint::Hooked(hooked)) => Some(Arc::clone(hooked)),
            _ => None,
        }
    }

    /// Returns the module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether hooks have been installed.
    pub fn is_hooked(&self) -> bool {
        self.hooked
    }
}

/// Replaces one entry point with a hooked wrapper around its previous value.
///
/// An entry point that is already hooked is left as is and reported as a
/// conflict.
fn hook_callback(
    host: &mut HostModule,
    name: CallbackName,
    registry: &Arc<CallbackRegistry>,
) -> AppResult<bool> {
    let main = match host.entry_points.get(&name) {
        Some(EntryPoint::Raw(handler)) => Some(Arc::clone(handler)),
        Some(EntryPoint::Hooked(_)) => {
            return Err(AppError::conflict(format!(
                "Callback '{name}' on module '{}' is already hooked",
                host.name
            )));
        }
        None => None,
    };
    let has_main = main.is_some();

    host.entry_points.insert(
        name,
        EntryPoint::Hooked(Arc::new(HookedCallback::new(name, main, Arc::clone(registry)))),
    );
    Ok(has_main)
}

/// Hooks every recognized callback on the host's main module.
///
/// Runs once per process, before the import interceptor is installed. A
/// second call on the same module is refused instead of double-wrapping.
pub fn hook_callbacks(host: &mut HostModule, registry: &Arc<CallbackRegistry>) -> AppResult<usize> {
    if host.hooked {
        return Err(AppError::conflict(format!(
            "Callbacks on module '{}' are already hooked",
            host.name
        )));
    }

    let mut with_main = 0;
    for name in CallbackName::ALL {
        if hook_callback(host, *name, registry)? {
            with_main += 1;
        }
    }
    host.hooked = true;

    info!(
        module = %host.name,
        callbacks = CallbackName::ALL.len(),
        main_handlers = with_main,
        "Host callbacks hooked"
    );

    Ok(CallbackName::ALL.len())
}
