//! Port traits — the boundary between the scheduler core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RunLoop / InputDispatcher (core)
//! ```
//!
//! Actuators, touch inputs, event sinks and I²C buses implement these
//! traits.  The core only ever holds trait objects, so every piece of
//! hardware can be replaced by a mock in tests.
//!
//! ## Threading notes
//!
//! - [`Actuator`] methods take `&self`: the run loop calls `operate` while
//!   the touch thread may call `change_route` on the same actuator.
//!   Implementations synchronise internally.
//! - `operate` must return quickly.  A hanging actuator stalls the whole
//!   loop and defeats the shutdown deadline.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use embedded_hal::i2c::{Error as _, I2c};
use embedded_hal::pwm::SetDutyCycle;

use super::events::TurnoutEvent;
use crate::error::OutputError;

// ───────────────────────────────────────────────────────────────
// Actuator port (core → animated device)
// ───────────────────────────────────────────────────────────────

/// A named device with animated position state.
pub trait Actuator: Send + Sync {
    fn name(&self) -> &str;

    /// Advance motion to `now`.  Returns `true` while still animating.
    fn operate(&self, now: Instant) -> bool;

    /// Command a direction/position change starting at `now`.
    fn change_route(&self, now: Instant);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (actuator → logging / transmit)
// ───────────────────────────────────────────────────────────────

/// Receives state-changed notifications.  Called from whichever thread
/// drove the change, so implementations must be `Sync`.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &TurnoutEvent);
}

// ───────────────────────────────────────────────────────────────
// Touch input port (hardware callback → dispatcher)
// ───────────────────────────────────────────────────────────────

/// An edge-triggered touch on a named source (pad).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchEvent {
    pub source: String,
}

impl TouchEvent {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Single dispatch callback for every registered source.
pub type TouchHandler = Box<dyn Fn(TouchEvent) + Send + Sync>;

/// Registration side of a touch driver.
pub trait TouchInput {
    /// Deliver touches on any of `sources` to `handler`.  The handler runs
    /// in the driver's own execution context.
    fn on_touch(&mut self, sources: &[String], handler: TouchHandler) -> anyhow::Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Output channels
// ───────────────────────────────────────────────────────────────

/// Type-erased PWM channel handed out by an output provider.
pub type PwmChannel = Box<dyn SetDutyCycle<Error = OutputError> + Send>;

// ───────────────────────────────────────────────────────────────
// Register bus (provider → I²C hardware)
// ───────────────────────────────────────────────────────────────

/// Minimal write-only view of an I²C bus, implemented for every
/// `embedded-hal` I²C master.
pub trait RegisterBus: Send {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), OutputError>;
}

impl<T: I2c + Send> RegisterBus for T {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), OutputError> {
        I2c::write(self, address, bytes).map_err(|e| OutputError::Bus(e.kind()))
    }
}

/// A bus shared by every controller attached to it.
pub type SharedBus = Arc<Mutex<dyn RegisterBus>>;

/// Opens I²C buses by number.  Called once per bus during configuration.
pub trait BusProvider {
    fn bus(&mut self, id: u8) -> anyhow::Result<SharedBus>;
}
