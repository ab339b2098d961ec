//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};

use samphook_callbacks::prelude::*;
use samphook_core::config::callbacks::CallbackConfig;

/// Records observer invocations as `label(first_arg)` strings.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that logs its label and first argument, then returns `action`.
    pub fn handler(&self, label: &str, action: CallbackAction) -> Arc<dyn CallbackHandler> {
        let calls = Arc::clone(&self.calls);
        let label_owned = label.to_string();
        ClosureHandler::wrap(label, move |args| {
            let entry = match args.get_i64(0) {
                Some(id) => format!("{label_owned}({id})"),
                None => format!("{label_owned}()"),
            };
            calls.lock().unwrap().push(entry);
            Ok(action)
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// A started manager over an empty module table, with no main handlers.
pub fn start_manager() -> CallbackManager {
    start_manager_with(HostModule::new("python"), Arc::new(ModuleTable::new()))
}

pub fn start_manager_with(host: HostModule, modules: Arc<ModuleTable>) -> CallbackManager {
    CallbackManager::start(&CallbackConfig::default(), host, modules).unwrap()
}
