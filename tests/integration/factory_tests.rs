//! Building the registry from YAML against a simulated bus.

use std::sync::Arc;

use turnout_service::app::factory::ActuatorFactory;
use turnout_service::app::ports::EventSink;
use turnout_service::app::service::TurnoutService;
use turnout_service::config::{ConfigDocument, ServiceConfig};
use turnout_service::error::{FatalReason, ServiceError, StartupError};

use crate::mock_hw::{RecordingBuses, RecordingSink};

const MODE1_SLEEP: [u8; 2] = [0x00, 0x10];

fn config(turnouts: &str) -> ServiceConfig {
    let text = format!(
        "logging: {{}}\nservices:\n  turnout:\n    update-rate: 0.02\n    angular-speed: 60.0\n    turnouts:\n{turnouts}"
    );
    ConfigDocument::parse(&text).unwrap().service().unwrap()
}

fn factory(buses: &RecordingBuses) -> ActuatorFactory {
    let sink: Arc<dyn EventSink> = Arc::new(RecordingSink::default());
    ActuatorFactory::new(Box::new(buses.clone()), sink)
}

const A_AND_B: &str = "
      - name: A
        angles: { main: 80, diverging: 100 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x40, pin: 0 }
          - { name: frog, type: PCA9685, address: 0x40, pin: 1 }
      - name: B
        angles: { main: 90, diverging: 70 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x41, pin: 0, bus: 3 }
          - { name: frog, type: PCA9685, address: 0x40, pin: 2 }
";

#[test]
fn registry_keys_are_turnout_names() {
    let buses = RecordingBuses::default();
    let registry = factory(&buses).build_registry(&config(A_AND_B)).unwrap();
    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn controllers_are_shared_per_bus_and_address() {
    let buses = RecordingBuses::default();
    factory(&buses).build_registry(&config(A_AND_B)).unwrap();

    // 0x40 on bus 1 serves three outputs but is initialised once;
    // 0x41 on bus 3 is a separate controller.
    let sleeps = |addr: u8| {
        buses
            .bus
            .writes()
            .iter()
            .filter(|(a, bytes)| *a == addr && bytes[..] == MODE1_SLEEP)
            .count()
    };
    assert_eq!(sleeps(0x40), 1);
    assert_eq!(sleeps(0x41), 1);
    assert_eq!(*buses.opened.lock().unwrap(), [1, 3]);
}

#[test]
fn duplicate_names_keep_the_last_entry() {
    let twice = "
      - name: A
        angles: { main: 80, diverging: 100 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x40, pin: 0 }
          - { name: frog, type: PCA9685, address: 0x40, pin: 1 }
      - name: A
        angles: { main: 10, diverging: 20 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x40, pin: 4 }
          - { name: frog, type: PCA9685, address: 0x40, pin: 5 }
";
    let buses = RecordingBuses::default();
    let registry = factory(&buses).build_registry(&config(twice)).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("A"));
}

#[test]
fn unknown_output_type_fails_with_status_five() {
    let bad = "
      - name: A
        angles: { main: 80, diverging: 100 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x40, pin: 0 }
          - { name: frog, type: GPIO, pin: 17 }
";
    let buses = RecordingBuses::default();
    let err = factory(&buses).build_registry(&config(bad)).err().unwrap();
    assert!(err.to_string().contains("cannot build output type 'GPIO'"));
    let startup: StartupError = err.into();
    assert_eq!(startup.reason(), FatalReason::ServiceInvalid);
}

#[test]
fn missing_frog_role_fails() {
    let bad = "
      - name: A
        angles: { main: 80, diverging: 100 }
        outputs:
          - { name: servo, type: PCA9685, address: 0x40, pin: 0 }
          - { name: relay, type: PCA9685, address: 0x40, pin: 1 }
";
    let buses = RecordingBuses::default();
    let err = factory(&buses).build_registry(&config(bad)).err().unwrap();
    assert!(matches!(
        err,
        ServiceError::MissingOutputRole { role: "frog", .. }
    ));
}

#[test]
fn service_rejects_unvalidated_config() {
    // Deserialised directly, bypassing ConfigDocument::service.
    let cfg: ServiceConfig = serde_yaml::from_str(
        "
update-rate: 0.0
angular-speed: 60.0
turnouts:
  - name: A
    angles: { main: -500, diverging: 900 }
    outputs:
      - { name: servo, type: PCA9685, address: 0x40, pin: 0 }
      - { name: frog, type: PCA9685, address: 0x40, pin: 1 }
",
    )
    .unwrap();
    let buses = RecordingBuses::default();
    let err = TurnoutService::from_config(
        &cfg,
        Box::new(buses.clone()),
        Arc::new(RecordingSink::default()),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        ServiceError::InvalidValue { ref field, .. } if field == "update-rate"
    ));
    // Nothing was opened before validation failed.
    assert!(buses.opened.lock().unwrap().is_empty());
}

#[test]
fn service_rejects_out_of_range_angles() {
    let mut cfg = config(A_AND_B);
    cfg.turnouts[1].angles.diverging = 181.0;
    let err = TurnoutService::from_config(
        &cfg,
        Box::new(RecordingBuses::default()),
        Arc::new(RecordingSink::default()),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        ServiceError::InvalidValue { ref field, .. } if field == "B.angles.diverging"
    ));
}
