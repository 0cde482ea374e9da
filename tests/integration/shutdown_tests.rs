//! Shutdown coordination against a running loop.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use turnout_service::app::ports::{Actuator, TouchEvent};
use turnout_service::app::service::TurnoutService;
use turnout_service::config::ConfigDocument;
use turnout_service::shutdown::ShutdownPhase;

use crate::mock_hw::{MockActuator, RecordingBuses, RecordingSink, eventually, registry_of};

#[test]
fn shutdown_while_idle_stops_cleanly() {
    let a = MockActuator::new("A", 3);
    let svc = Arc::new(TurnoutService::from_registry(
        registry_of(&[&a]),
        Duration::from_millis(10),
        Duration::from_secs(2),
    ));
    let runner = {
        let svc = Arc::clone(&svc);
        thread::spawn(move || svc.run())
    };
    assert!(eventually(Duration::from_secs(1), || a.polls() == 1));

    let start = Instant::now();
    assert_eq!(
        svc.coordinator().request_shutdown(),
        Some(ShutdownPhase::Stopped)
    );
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(svc.state().exit_wake().is_set());
    runner.join().unwrap();

    // A second signal is ignored.
    assert_eq!(svc.coordinator().request_shutdown(), None);
    assert_eq!(svc.coordinator().phase(), ShutdownPhase::Stopped);
}

#[test]
fn slow_actuator_forces_exit_after_deadline() {
    let slow = MockActuator::slow("A", 1000, Duration::from_millis(300));
    let svc = Arc::new(TurnoutService::from_registry(
        registry_of(&[&slow]),
        Duration::from_millis(10),
        Duration::from_millis(50),
    ));
    slow.change_route(Instant::now());
    let runner = {
        let svc = Arc::clone(&svc);
        thread::spawn(move || svc.run())
    };
    // Loop is inside the first, slow operate call.
    assert!(eventually(Duration::from_secs(1), || slow.polls() >= 1));

    let start = Instant::now();
    assert_eq!(
        svc.coordinator().request_shutdown(),
        Some(ShutdownPhase::ForcedExit)
    );
    let waited = start.elapsed();
    assert!(waited >= Duration::from_millis(50));
    assert!(waited < Duration::from_millis(300));

    // The loop still finishes on its own once operate returns.
    runner.join().unwrap();
    assert!(svc.state().exit_wake().is_set());
}

const TWO_TURNOUTS: &str = r"
logging: {}
services:
  turnout:
    update-rate: 0.02
    angular-speed: 60.0
    turnouts:
      - name: A
        angles: { main: 80, diverging: 100 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x40, pin: 0 }
          - { name: frog, type: PCA9685, address: 0x40, pin: 1 }
      - name: B
        angles: { main: 90, diverging: 70 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x40, pin: 2 }
          - { name: frog, type: PCA9685, address: 0x40, pin: 3 }
";

#[test]
fn route_change_then_signal_exits_within_deadline() {
    let config = ConfigDocument::parse(TWO_TURNOUTS)
        .unwrap()
        .service()
        .unwrap();
    let sink = Arc::new(RecordingSink::default());
    let svc = Arc::new(
        TurnoutService::from_config(
            &config,
            Box::new(RecordingBuses::default()),
            Arc::clone(&sink) as _,
        )
        .unwrap(),
    );
    let runner = {
        let svc = Arc::clone(&svc);
        thread::spawn(move || svc.run())
    };

    assert!(svc.dispatcher().dispatch(&TouchEvent::new("A")));
    let phase = svc.coordinator().request_shutdown();
    assert_eq!(phase, Some(ShutdownPhase::Stopped));
    assert_eq!(svc.coordinator().deadline(), Duration::from_secs(5));
    runner.join().unwrap();

    // The route change was announced even though A never finished moving.
    assert!(!sink.events().is_empty());
}
