//! Handler trait and closure adapters.

use std::sync::Arc;

use crate::hooks::definitions::{CallbackArgs, CallbackResult};

/// Anything that can receive a host callback: observers, main handlers, and
/// the hooked wrappers installed over the host's entry points.
pub trait CallbackHandler: Send + Sync + std::fmt::Debug {
    /// Handles one callback invocation.
    ///
    /// Return `Ok(CallbackAction::Suppress)` to stop later handlers from
    /// seeing this call. Errors are propagated to whoever fired the callback.
    fn handle(&self, args: &CallbackArgs) -> CallbackResult;
}

/// A closure-based handler for quick handler creation.
pub struct ClosureHandler {
    /// Label shown in debug output.
    label: String,
    /// Handler function.
    handler: Box<dyn Fn(&CallbackArgs) -> CallbackResult + Send + Sync>,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("label", &self.label)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler.
    pub fn new<F>(label: &str, handler: F) -> Self
    where
        F: Fn(&CallbackArgs) -> CallbackResult + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            handler: Box::new(handler),
        }
    }

    /// Wraps a closure into an `Arc<dyn CallbackHandler>`.
    pub fn wrap<F>(label: &str, handler: F) -> Arc<dyn CallbackHandler>
    where
        F: Fn(&CallbackArgs) -> CallbackResult + Send + Sync + 'static,
    {
        Arc::new(Self::new(label, handler))
    }

    /// Returns the handler's label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl CallbackHandler for ClosureHandler {
    fn handle(&self, args: &CallbackArgs) -> CallbackResult {
        (self.handler)(args)
    }
}
