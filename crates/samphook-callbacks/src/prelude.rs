//! Prelude for convenient imports.

pub use crate::exports::{ModuleExports, StaticModule};
pub use crate::hooks::definitions::{
    CallbackAction, CallbackArgs, CallbackName, CallbackResult, DispatchOutcome,
};
pub use crate::hooks::dispatcher::{HostModule, hook_callbacks};
pub use crate::hooks::registry::CallbackRegistry;
pub use crate::loader::ModuleLoader;
pub use crate::manager::CallbackManager;
pub use crate::module::{ExtensionModule, ModuleTable};
pub use crate::traits::{CallbackHandler, ClosureHandler};

pub use crate::callback_args;
