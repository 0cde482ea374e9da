//! Mock adapters for integration tests.
//!
//! Records every call so tests can assert on polling and routing history
//! without touching real I²C or touch hardware.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use turnout_service::adapters::i2c::SimulatedBus;
use turnout_service::app::events::TurnoutEvent;
use turnout_service::app::ports::{
    Actuator, BusProvider, EventSink, SharedBus, TouchEvent, TouchHandler, TouchInput,
};
use turnout_service::app::registry::ActuatorRegistry;

// ── MockActuator ──────────────────────────────────────────────

/// Reports motion for `frames_per_change` polls after each route change.
pub struct MockActuator {
    name: String,
    frames_per_change: u32,
    remaining: AtomicU32,
    /// Time each `operate` call takes.
    operate_delay: Duration,
    pub polls: AtomicUsize,
    pub animating_polls: AtomicUsize,
    pub changes: AtomicUsize,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new(name: &str, frames_per_change: u32) -> Arc<Self> {
        Self::slow(name, frames_per_change, Duration::ZERO)
    }

    pub fn slow(name: &str, frames_per_change: u32, operate_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            frames_per_change,
            remaining: AtomicU32::new(0),
            operate_delay,
            polls: AtomicUsize::new(0),
            animating_polls: AtomicUsize::new(0),
            changes: AtomicUsize::new(0),
        })
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn animating_polls(&self) -> usize {
        self.animating_polls.load(Ordering::SeqCst)
    }

    pub fn changes(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }
}

impl Actuator for MockActuator {
    fn name(&self) -> &str {
        &self.name
    }

    fn operate(&self, _now: Instant) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if !self.operate_delay.is_zero() {
            thread::sleep(self.operate_delay);
        }
        let animating = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if animating {
            self.animating_polls.fetch_add(1, Ordering::SeqCst);
        }
        animating
    }

    fn change_route(&self, _now: Instant) {
        self.changes.fetch_add(1, Ordering::SeqCst);
        self.remaining.store(self.frames_per_change, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
pub fn registry_of(actuators: &[&Arc<MockActuator>]) -> ActuatorRegistry {
    actuators
        .iter()
        .map(|a| (a.name().to_string(), Arc::clone(*a) as Arc<dyn Actuator>))
        .collect()
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<TurnoutEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<TurnoutEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &TurnoutEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── ScriptedTouch ─────────────────────────────────────────────

/// Touch input driven by the test: `touch("A")` invokes the registered
/// handler on the calling thread.
#[derive(Default)]
pub struct ScriptedTouch {
    pub sources: Vec<String>,
    handler: Option<TouchHandler>,
}

#[allow(dead_code)]
impl ScriptedTouch {
    pub fn touch(&self, source: &str) {
        let handler = self.handler.as_ref().expect("no handler registered");
        handler(TouchEvent::new(source));
    }
}

impl TouchInput for ScriptedTouch {
    fn on_touch(&mut self, sources: &[String], handler: TouchHandler) -> anyhow::Result<()> {
        self.sources = sources.to_vec();
        self.handler = Some(handler);
        Ok(())
    }
}

/// Touch input whose registration always fails.
pub struct BrokenTouch;

impl TouchInput for BrokenTouch {
    fn on_touch(&mut self, _sources: &[String], _handler: TouchHandler) -> anyhow::Result<()> {
        anyhow::bail!("touch controller not responding")
    }
}

// ── RecordingBuses ────────────────────────────────────────────

/// Every bus number maps to the same [`SimulatedBus`]; opens are counted.
#[derive(Clone, Default)]
pub struct RecordingBuses {
    pub bus: SimulatedBus,
    pub opened: Arc<Mutex<Vec<u8>>>,
}

impl BusProvider for RecordingBuses {
    fn bus(&mut self, id: u8) -> anyhow::Result<SharedBus> {
        self.opened.lock().unwrap().push(id);
        Ok(Arc::new(Mutex::new(self.bus.clone())))
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Poll `cond` until it holds or `limit` elapses.
#[allow(dead_code)]
pub fn eventually(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
