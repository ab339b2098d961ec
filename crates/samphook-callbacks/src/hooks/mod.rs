//! Callback system: registry, hooked entry points, and callback definitions.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{CallbackAction, CallbackArgs, CallbackName, CallbackResult, DispatchOutcome};
pub use dispatcher::{HookedCallback, HostModule, hook_callbacks};
pub use registry::{CallbackRegistry, ModuleLoadGuard};
