//! samphook demo: drives the callback machinery the way a game server would.
//!
//! Hooks the main module, imports a vehicles extension module, fires
//! `OnVehicleDeath`, revokes the module's callbacks, and fires again.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use samphook_callbacks::prelude::*;
use samphook_core::config::AppConfig;
use samphook_core::error::AppError;

fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config) {
        tracing::error!("Demo error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SAMPHOOK_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting samphook demo v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Host main module with its own handler ───────────
    let mut host = HostModule::new(&config.callbacks.main_module);
    host.define(
        CallbackName::OnVehicleDeath,
        ClosureHandler::wrap("main.OnVehicleDeath", |args| {
            tracing::info!(vehicle_id = ?args.get_i64(0), "Main handler: vehicle died");
            Ok(CallbackAction::Continue)
        }),
    )?;

    // ── Step 2: Hook callbacks, then install the import interceptor ─
    let modules = Arc::new(ModuleTable::new());
    let manager = CallbackManager::start(&config.callbacks, host, modules)?;

    // ── Step 3: Import an extension module ──────────────────────
    let vehicles_name = format!("{}vehicles", config.callbacks.namespace_prefix());
    let vehicles = StaticModule::builder(&vehicles_name)
        .on_fn(CallbackName::OnVehicleDeath, |args| {
            let vehicle_id = args.require_i64(0)?;
            tracing::info!(vehicle_id, "Vehicles module: respawning vehicle");
            Ok(CallbackAction::Continue)
        })
        .build();
    manager.import(vehicles)?;

    // ── Step 4: Fire, revoke, fire again ────────────────────────
    kill_vehicle(&manager, 123)?;

    let revoked = manager.unregister(&vehicles_name)?;
    tracing::info!(module = %vehicles_name, revoked, "Module callbacks revoked");

    kill_vehicle(&manager, 124)?;

    Ok(())
}

fn kill_vehicle(manager: &CallbackManager, vehicle_id: i64) -> Result<(), AppError> {
    tracing::info!(vehicle_id, "Firing OnVehicleDeath");
    manager.fire(CallbackName::OnVehicleDeath, &callback_args![vehicle_id])?;
    Ok(())
}
