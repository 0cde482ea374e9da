//! The run loop.
//!
//! One long-lived loop owns actuator polling.  Each pass asks every
//! actuator to advance its motion, then blocks on the wake event.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       while is_alive                         │
//! │                                                              │
//! │   poll(now) ──▶ any operate() == true ? ──yes──▶ update_rate │
//! │                          │                           │       │
//! │                          no                          │       │
//! │                          ▼                           ▼       │
//! │                    wait(forever)              wait(timeout)  │
//! │                          │                           │       │
//! │                          └──────[woken]──▶ clear() ◀─┘       │
//! └──────────────────────────────────────────────────────────────┘
//!             │
//!             ▼
//!   cleanup ──▶ exit_wake.set()
//! ```
//!
//! With nothing animating the loop sleeps until a route change or a
//! shutdown request sets the wake event; while anything animates it polls
//! every `update_rate`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::app::registry::ActuatorRegistry;
use crate::events::SchedulerState;

pub struct RunLoop {
    registry: Arc<ActuatorRegistry>,
    state: Arc<SchedulerState>,
    update_rate: Duration,
    cycles: u64,
}

impl RunLoop {
    pub fn new(
        registry: Arc<ActuatorRegistry>,
        state: Arc<SchedulerState>,
        update_rate: Duration,
    ) -> Self {
        Self {
            registry,
            state,
            update_rate,
            cycles: 0,
        }
    }

    /// Poll passes completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn update_rate(&self) -> Duration {
        self.update_rate
    }

    /// Operate every actuator once, in name order.  Returns the timeout
    /// for the following wait: `update_rate` if any actuator is still
    /// animating, otherwise `None` (wait indefinitely).
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        self.cycles += 1;
        let mut timeout = None;
        // Every actuator is polled even after one reports motion.
        for (_, actuator) in self.registry.iter() {
            if actuator.operate(now) {
                timeout = Some(self.update_rate);
            }
        }
        timeout
    }

    /// Run until the liveness flag is cleared, then raise the exit event.
    pub fn run(&mut self) {
        info!(
            "Run loop started: {} turnout(s), update rate {:?}",
            self.registry.len(),
            self.update_rate
        );

        while self.state.is_alive() {
            let timeout = self.poll(Instant::now());
            trace!("cycle {}: wait {:?}", self.cycles, timeout);
            if self.state.wake().wait(timeout) {
                self.state.wake().clear();
            }
        }

        self.shutdown();
        self.state.exit_wake().set();
    }

    fn shutdown(&mut self) {
        info!("Shutting down now");
        debug!("Run loop exited after {} cycle(s)", self.cycles);
    }
}
