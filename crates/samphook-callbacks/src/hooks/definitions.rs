//! Recognized callback names, call arguments, and handler results.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use samphook_core::error::AppError;
use samphook_core::result::AppResult;

/// Enumeration of every host callback that can be hooked.
///
/// Variant names match the host's entry point names exactly, so a module
/// exporting `OnVehicleDeath` is matched against [`CallbackName::OnVehicleDeath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallbackName {
    // ── Game mode ──
    /// Fired when the game mode is initialised.
    OnGameModeInit,
    /// Fired when the game mode exits.
    OnGameModeExit,

    // ── Player ──
    /// Fired when a player connects. Args: `(playerid)`.
    OnPlayerConnect,
    /// Fired when a player disconnects. Args: `(playerid, reason)`.
    OnPlayerDisconnect,
    /// Fired when a player spawns. Args: `(playerid)`.
    OnPlayerSpawn,
    /// Fired when a player dies. Args: `(playerid, killerid, reason)`.
    OnPlayerDeath,
    /// Fired when a player sends a chat message. Args: `(playerid, text)`.
    OnPlayerText,
    /// Fired when a player enters a command. Args: `(playerid, cmdtext)`.
    OnPlayerCommandText,

    // ── Vehicle ──
    /// Fired when a vehicle respawns. Args: `(vehicleid)`.
    OnVehicleSpawn,
    /// Fired when a vehicle is destroyed. Args: `(vehicleid)`.
    OnVehicleDeath,
}

impl CallbackName {
    /// Every recognized callback, in the order modules are scanned.
    pub const ALL: &'static [CallbackName] = &[
        Self::OnGameModeInit,
        Self::OnGameModeExit,
        Self::OnPlayerConnect,
        Self::OnPlayerDisconnect,
        Self::OnPlayerSpawn,
        Self::OnPlayerDeath,
        Self::OnPlayerText,
        Self::OnPlayerCommandText,
        Self::OnVehicleSpawn,
        Self::OnVehicleDeath,
    ];

    /// Returns the host-facing name of this callback.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnGameModeInit => "OnGameModeInit",
            Self::OnGameModeExit => "OnGameModeExit",
            Self::OnPlayerConnect => "OnPlayerConnect",
            Self::OnPlayerDisconnect => "OnPlayerDisconnect",
            Self::OnPlayerSpawn => "OnPlayerSpawn",
            Self::OnPlayerDeath => "OnPlayerDeath",
            Self::OnPlayerText => "OnPlayerText",
            Self::OnPlayerCommandText => "OnPlayerCommandText",
            Self::OnVehicleSpawn => "OnVehicleSpawn",
            Self::OnVehicleDeath => "OnVehicleDeath",
        }
    }
}

impl std::fmt::Display for CallbackName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CallbackName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| AppError::not_found(format!("Unknown callback name '{s}'")))
    }
}

/// Arguments the host passes to a callback.
///
/// Observers receive exactly what the host passed; nothing here is validated
/// against the callback's expected signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackArgs {
    /// Positional arguments in call order.
    pub positional: Vec<serde_json::Value>,
    /// Keyword arguments.
    pub keyword: HashMap<String, serde_json::Value>,
}

impl CallbackArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn with_arg(mut self, value: serde_json::Value) -> Self {
        self.positional.push(value);
        self
    }

    /// Appends an integer positional argument.
    pub fn with_int(self, value: i64) -> Self {
        self.with_arg(serde_json::json!(value))
    }

    /// Appends a string positional argument.
    pub fn with_string(self, value: &str) -> Self {
        self.with_arg(serde_json::json!(value))
    }

    /// Appends a boolean positional argument.
    pub fn with_bool(self, value: bool) -> Self {
        self.with_arg(serde_json::json!(value))
    }

    /// Inserts a keyword argument.
    pub fn with_kwarg(mut self, key: &str, value: serde_json::Value) -> Self {
        self.keyword.insert(key.to_string(), value);
        self
    }

    /// Gets a positional argument by index.
    pub fn arg(&self, index: usize) -> Option<&serde_json::Value> {
        self.positional.get(index)
    }

    /// Gets a positional argument as an `i64`.
    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.positional.get(index).and_then(|v| v.as_i64())
    }

    /// Gets a positional argument as a string.
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.positional.get(index).and_then(|v| v.as_str())
    }

    /// Gets a keyword argument.
    pub fn kwarg(&self, key: &str) -> Option<&serde_json::Value> {
        self.keyword.get(key)
    }

    /// Gets a positional integer argument, failing if it is missing or not an integer.
    pub fn require_i64(&self, index: usize) -> AppResult<i64> {
        self.get_i64(index).ok_or_else(|| {
            AppError::callback(format!("Expected integer argument at position {index}"))
        })
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Returns true if there are neither positional nor keyword arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Action returned by a handler telling the dispatcher what to do next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackAction {
    /// Continue to the next handler.
    #[default]
    Continue,
    /// Stop the fan-out; no later handler sees this call.
    Suppress,
}

impl CallbackAction {
    /// Returns true for [`CallbackAction::Suppress`].
    pub fn is_suppress(&self) -> bool {
        matches!(self, Self::Suppress)
    }
}

/// `false` is the host's suppression value; `true` continues.
impl From<bool> for CallbackAction {
    fn from(value: bool) -> Self {
        if value { Self::Continue } else { Self::Suppress }
    }
}

impl From<()> for CallbackAction {
    fn from(_: ()) -> Self {
        Self::Continue
    }
}

/// Result returned from a handler invocation.
pub type CallbackResult = AppResult<CallbackAction>;

/// Summary of one dispatch pass over the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The callback that was dispatched.
    pub callback: CallbackName,
    /// How many observers were invoked, including a suppressing one.
    pub invoked: usize,
    /// Group of the observer that suppressed the fan-out, if any.
    pub suppressed_by: Option<String>,
}

impl DispatchOutcome {
    /// Returns whether the fan-out was cut short.
    pub fn suppressed(&self) -> bool {
        self.suppressed_by.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_name_round_trips_through_str() {
        for name in CallbackName::ALL {
            let parsed: CallbackName = name.as_str().parse().expect("known name");
            assert_eq!(parsed, *name);
        }
    }

    #[test]
    fn test_unknown_callback_name() {
        let err = "OnPlayerFly".parse::<CallbackName>().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_display_matches_host_name() {
        assert_eq!(CallbackName::OnVehicleDeath.to_string(), "OnVehicleDeath");
    }

    #[test]
    fn test_only_false_suppresses() {
        assert_eq!(CallbackAction::from(false), CallbackAction::Suppress);
        assert_eq!(CallbackAction::from(true), CallbackAction::Continue);
        assert_eq!(CallbackAction::from(()), CallbackAction::Continue);
        assert_eq!(CallbackAction::default(), CallbackAction::Continue);
    }

    #[test]
    fn test_args_accessors() {
        let args = CallbackArgs::new()
            .with_int(123)
            .with_string("crash")
            .with_kwarg("killerid", serde_json::json!(7));

        assert_eq!(args.len(), 2);
        assert_eq!(args.get_i64(0), Some(123));
        assert_eq!(args.get_str(1), Some("crash"));
        assert_eq!(args.get_i64(1), None);
        assert_eq!(args.kwarg("killerid"), Some(&serde_json::json!(7)));
        assert_eq!(args.require_i64(0).unwrap(), 123);
        assert!(args.require_i64(5).is_err());
        assert!(!args.is_empty());
        assert!(CallbackArgs::new().is_empty());
    }
}
