//! Touch registration and routing through the service.

use std::time::Duration;

use turnout_service::app::service::TurnoutService;
use turnout_service::error::{FatalReason, ServiceError, StartupError};

use crate::mock_hw::{BrokenTouch, MockActuator, ScriptedTouch, registry_of};

fn service(names: &[&str]) -> (TurnoutService, Vec<std::sync::Arc<MockActuator>>) {
    let mocks: Vec<_> = names.iter().map(|n| MockActuator::new(n, 2)).collect();
    let refs: Vec<_> = mocks.iter().collect();
    let svc = TurnoutService::from_registry(
        registry_of(&refs),
        Duration::from_millis(10),
        Duration::from_secs(1),
    );
    (svc, mocks)
}

#[test]
fn registers_every_turnout_name_as_a_source() {
    let (svc, _) = service(&["C", "A", "B"]);
    let mut touch = ScriptedTouch::default();
    svc.attach_input(&mut touch).unwrap();
    assert_eq!(touch.sources, ["A", "B", "C"]);
}

#[test]
fn touch_routes_to_the_named_turnout_and_wakes() {
    let (svc, mocks) = service(&["A", "B"]);
    let mut touch = ScriptedTouch::default();
    svc.attach_input(&mut touch).unwrap();

    touch.touch("B");
    assert_eq!(mocks[0].changes(), 0);
    assert_eq!(mocks[1].changes(), 1);
    assert!(svc.state().wake().is_set());
}

#[test]
fn unknown_touch_is_discarded() {
    let (svc, mocks) = service(&["A"]);
    let mut touch = ScriptedTouch::default();
    svc.attach_input(&mut touch).unwrap();

    touch.touch("D");
    assert_eq!(mocks[0].changes(), 0);
    assert!(!svc.state().wake().is_set());
}

#[test]
fn failed_registration_is_a_service_error() {
    let (svc, _) = service(&["A"]);
    let err = svc.attach_input(&mut BrokenTouch).unwrap_err();
    assert!(matches!(err, ServiceError::Input(_)));
    let startup: StartupError = err.into();
    assert_eq!(startup.reason(), FatalReason::ServiceInvalid);
}
