//! Touch events → route changes.
//!
//! Runs in the touch driver's context, not the run loop's.  It only
//! reads the frozen registry, calls `change_route` (which the actuator
//! synchronises internally) and raises the wake event so the loop starts
//! animating without waiting out its timeout.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use super::ports::{TouchEvent, TouchInput};
use super::registry::ActuatorRegistry;
use crate::error::{Result, ServiceError};
use crate::events::SchedulerState;

pub struct InputDispatcher {
    registry: Arc<ActuatorRegistry>,
    state: Arc<SchedulerState>,
}

impl InputDispatcher {
    pub fn new(registry: Arc<ActuatorRegistry>, state: Arc<SchedulerState>) -> Self {
        Self { registry, state }
    }

    /// Handle a touch as if it arrived at `now`.  Returns whether it
    /// matched a turnout.
    pub fn dispatch_at(&self, event: &TouchEvent, now: Instant) -> bool {
        debug!("RX: {}", event.source);
        // A touch source is named after the turnout it moves.
        let Some(actuator) = self.registry.get(&event.source) else {
            debug!("RX: no turnout named '{}', ignored", event.source);
            return false;
        };
        info!("Moving turnout: {}", event.source);
        actuator.change_route(now);
        self.state.wake().set();
        true
    }

    pub fn dispatch(&self, event: &TouchEvent) -> bool {
        self.dispatch_at(event, Instant::now())
    }

    /// Subscribe to every turnout name on `input`.
    pub fn register(self: Arc<Self>, input: &mut dyn TouchInput) -> Result<()> {
        let sources: Vec<String> = self.registry.names().map(str::to_string).collect();
        input
            .on_touch(
                &sources,
                Box::new(move |event| {
                    self.dispatch(&event);
                }),
            )
            .map_err(ServiceError::Input)
    }
}
