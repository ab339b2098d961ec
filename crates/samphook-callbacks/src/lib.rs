//! # samphook-callbacks
//!
//! Callback fan-out for an embedded game-server scripting runtime. Provides:
//!
//! - A registry of observers indexed by callback name and by owning group
//! - Hooked entry points that run the host's main handler before observers
//! - An import interceptor that auto-registers namespace modules' callbacks

pub mod exports;
pub mod hooks;
pub mod loader;
pub mod macros;
pub mod manager;
pub mod module;
pub mod prelude;
pub mod traits;

pub use exports::{ModuleExports, StaticModule};
pub use hooks::definitions::{
    CallbackAction, CallbackArgs, CallbackName, CallbackResult, DispatchOutcome,
};
pub use hooks::dispatcher::{HookedCallback, HostModule, hook_callbacks};
pub use hooks::registry::CallbackRegistry;
pub use loader::{ImportOrderWarning, ModuleLoader};
pub use manager::CallbackManager;
pub use module::{ExtensionModule, ModuleTable};

#[doc(hidden)]
pub use serde_json as __serde_json;
