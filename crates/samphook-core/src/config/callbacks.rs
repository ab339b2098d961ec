//! Callback hooking configuration.

use serde::{Deserialize, Serialize};

/// Settings for the hook installer and the module import interceptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackConfig {
    /// Designated namespace. Modules named `"{namespace}.*"` are scanned on import.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Name of the host's main event module whose entry points get hooked.
    #[serde(default = "default_main_module")]
    pub main_module: String,
}

impl CallbackConfig {
    /// Returns the module-name prefix that qualifies a module for auto-registration.
    pub fn namespace_prefix(&self) -> String {
        format!("{}.", self.namespace)
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            main_module: default_main_module(),
        }
    }
}

fn default_namespace() -> String {
    "python".to_string()
}

fn default_main_module() -> String {
    "python".to_string()
}
