//! Integration tests for hooking, fan-out, revocation, and auto-registration.

mod helpers;

use std::sync::Arc;

use helpers::{CallLog, start_manager, start_manager_with};
use samphook_callbacks::prelude::*;
use samphook_core::error::ErrorKind;

const DEATH: CallbackName = CallbackName::OnVehicleDeath;

#[test]
fn test_observer_receives_host_arguments() {
    let manager = start_manager();
    let log = CallLog::new();
    manager
        .registry()
        .register(DEATH, log.handler("f", CallbackAction::Continue), Some("g1"))
        .unwrap();

    manager.fire(DEATH, &callback_args![123]).unwrap();
    assert_eq!(log.calls(), vec!["f(123)"]);
}

#[test]
fn test_false_return_stops_later_observers() {
    let manager = start_manager();
    let log = CallLog::new();
    manager
        .registry()
        .register(DEATH, log.handler("f1", false.into()), Some("g1"))
        .unwrap();
    manager
        .registry()
        .register(DEATH, log.handler("f2", CallbackAction::Continue), Some("g1"))
        .unwrap();

    manager.fire(DEATH, &callback_args![7]).unwrap();
    assert_eq!(log.calls(), vec!["f1(7)"]);
}

#[test]
fn test_unregister_then_fire_and_revoke_again() {
    let manager = start_manager();
    let log = CallLog::new();
    manager
        .registry()
        .register(DEATH, log.handler("f", CallbackAction::Continue), Some("python.vehicles"))
        .unwrap();

    assert_eq!(manager.unregister("python.vehicles").unwrap(), 1);
    manager.fire(DEATH, &callback_args![1]).unwrap();
    assert!(log.calls().is_empty());

    let err = manager.unregister("python.vehicles").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn test_namespace_module_exports_are_auto_registered() {
    let manager = start_manager();
    let log = CallLog::new();
    let module = StaticModule::builder("python.vehicles")
        .on(DEATH, log.handler("OnVehicleDeath", CallbackAction::Continue))
        .build();

    manager.import(module).unwrap();

    assert_eq!(manager.registry().groups(), vec!["python.vehicles".to_string()]);
    assert_eq!(manager.registry().group_count("python.vehicles"), 1);

    manager.fire(DEATH, &callback_args![42]).unwrap();
    assert_eq!(log.calls(), vec!["OnVehicleDeath(42)"]);
}

#[test]
fn test_group_isolation() {
    let manager = start_manager();
    let log = CallLog::new();
    for group in ["python.vehicles", "python.other"] {
        manager
            .registry()
            .register(DEATH, log.handler(group, CallbackAction::Continue), Some(group))
            .unwrap();
    }

    manager.unregister("python.vehicles").unwrap();
    manager.fire(DEATH, &callback_args![5]).unwrap();
    assert_eq!(log.calls(), vec!["python.other(5)"]);
}

#[test]
fn test_revoked_group_never_dispatched_for_any_name() {
    let manager = start_manager();
    let log = CallLog::new();
    let module = StaticModule::builder("python.lifecycle")
        .on(CallbackName::OnPlayerConnect, log.handler("connect", CallbackAction::Continue))
        .on(CallbackName::OnPlayerDisconnect, log.handler("disconnect", CallbackAction::Continue))
        .on(DEATH, log.handler("death", CallbackAction::Continue))
        .build();
    manager.import(module).unwrap();

    assert_eq!(manager.unregister("python.lifecycle").unwrap(), 3);
    for name in CallbackName::ALL {
        manager.fire(*name, &callback_args![0]).unwrap();
    }
    assert!(log.calls().is_empty());
}

#[test]
fn test_main_handler_precedence() {
    let log = CallLog::new();

    let mut suppressing = HostModule::new("python");
    suppressing
        .define(DEATH, log.handler("main", CallbackAction::Suppress))
        .unwrap();
    let manager = start_manager_with(suppressing, Arc::new(ModuleTable::new()));
    manager
        .registry()
        .register(DEATH, log.handler("observer", CallbackAction::Continue), Some("g"))
        .unwrap();

    manager.fire(DEATH, &callback_args![1]).unwrap();
    assert_eq!(log.calls(), vec!["main(1)"]);

    log.clear();
    let mut continuing = HostModule::new("python");
    continuing
        .define(DEATH, log.handler("main", CallbackAction::Continue))
        .unwrap();
    let manager = start_manager_with(continuing, Arc::new(ModuleTable::new()));
    manager
        .registry()
        .register(DEATH, log.handler("observer", CallbackAction::Continue), Some("g"))
        .unwrap();

    manager.fire(DEATH, &callback_args![2]).unwrap();
    assert_eq!(log.calls(), vec!["main(2)", "observer(2)"]);
}

#[test]
fn test_preloaded_module_is_warned_about_and_not_registered() {
    let log = CallLog::new();
    let modules = Arc::new(ModuleTable::new());
    modules.insert(
        StaticModule::builder("python.early")
            .on(DEATH, log.handler("early", CallbackAction::Continue))
            .build(),
    );

    let manager = start_manager_with(HostModule::new("python"), modules);
    assert_eq!(manager.warnings().len(), 1);
    assert_eq!(
        manager.warnings()[0].to_string(),
        "Module python.early was imported before samphook, this is probably not what you want."
    );

    manager.fire(DEATH, &callback_args![3]).unwrap();
    assert!(log.calls().is_empty());
}

#[test]
fn test_observer_error_reaches_host() {
    let manager = start_manager();
    let module = StaticModule::builder("python.strict")
        .on_fn(DEATH, |args| {
            args.require_i64(0)?;
            Ok(CallbackAction::Continue)
        })
        .build();
    manager.import(module).unwrap();

    let err = manager
        .fire(DEATH, &callback_args!["not a vehicle id"])
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Callback);
}
