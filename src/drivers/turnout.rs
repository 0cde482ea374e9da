//! Servo-driven turnout with a powered frog.
//!
//! ```text
//!  Unsynced ──[first operate]──▶ Idle ──[change_route]──▶ Moving
//!                                 ▲                        │  ▲
//!                                 │                [target] │  │ [change_route]
//!                                 │                         ▼  │
//!                                 └────[next operate]──── Settled
//! ```
//!
//! While `Moving`, each `operate` advances the servo by
//! `angular_speed * elapsed` degrees.  Reaching the target enters
//! `Settled` (still reported as animating); the following `operate`
//! switches the frog to the new route and reports idle.  That extra cycle
//! gives the points time to close before the frog polarity flips, and it
//! guarantees at least one `true` from `operate` after every route change.
//!
//! The mechanism sits behind a mutex: the run loop polls from its own
//! thread while route changes arrive from the touch thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, warn};

use super::frog::PwmOutputPin;
use super::servo::Servo;
use crate::app::events::{Route, TurnoutEvent};
use crate::app::ports::{Actuator, EventSink};
use crate::config::RouteAngles;
use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// Outputs have never been written.
    Unsynced,
    Idle,
    Moving,
    /// At the target angle; frog not yet switched.
    Settled,
}

struct Mechanism {
    servo: Servo,
    frog: PwmOutputPin,
    route: Route,
    angle: f32,
    state: MotionState,
    last: Option<Instant>,
}

pub struct Turnout {
    name: String,
    angles: RouteAngles,
    /// Degrees per second.
    angular_speed: f32,
    sink: Arc<dyn EventSink>,
    mech: Mutex<Mechanism>,
}

impl Turnout {
    /// Starts on the main route, outputs untouched until the first poll.
    pub fn new(
        name: impl Into<String>,
        servo: Servo,
        frog: PwmOutputPin,
        angles: RouteAngles,
        angular_speed: f32,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let name = name.into();
        if !angular_speed.is_finite() || angular_speed <= 0.0 {
            return Err(ServiceError::InvalidValue {
                field: format!("{name}.angular-speed"),
                reason: "must be a positive number",
            });
        }
        Ok(Self {
            mech: Mutex::new(Mechanism {
                servo,
                frog,
                route: Route::Main,
                angle: angles.main,
                state: MotionState::Unsynced,
                last: None,
            }),
            name,
            angles,
            angular_speed,
            sink,
        })
    }

    pub fn route(&self) -> Route {
        self.lock().route
    }

    pub fn angle(&self) -> f32 {
        self.lock().angle
    }

    pub fn motion_state(&self) -> MotionState {
        self.lock().state
    }

    fn target(&self, route: Route) -> f32 {
        match route {
            Route::Main => self.angles.main,
            Route::Diverging => self.angles.diverging,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Mechanism> {
        self.mech.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Mechanism {
    fn drive_servo(&mut self, name: &str) {
        if let Err(e) = self.servo.set_angle(self.angle) {
            warn!("{}: servo write failed: {}", name, e);
        }
    }

    fn drive_frog(&mut self, name: &str) {
        let state = PinState::from(self.route == Route::Diverging);
        if let Err(e) = self.frog.set_state(state) {
            warn!("{}: frog write failed: {}", name, e);
        }
    }
}

impl Actuator for Turnout {
    fn name(&self) -> &str {
        &self.name
    }

    fn operate(&self, now: Instant) -> bool {
        let mut m = self.lock();
        let state = m.state;
        match state {
            MotionState::Idle => false,

            MotionState::Unsynced => {
                m.drive_servo(&self.name);
                m.drive_frog(&self.name);
                m.state = MotionState::Idle;
                debug!("{}: synced at {:.1}° ({:?})", self.name, m.angle, m.route);
                false
            }

            MotionState::Moving => {
                let elapsed = m
                    .last
                    .map_or(0.0, |t| now.saturating_duration_since(t).as_secs_f32());
                m.last = Some(now);

                let target = self.target(m.route);
                let remaining = target - m.angle;
                let step = self.angular_speed * elapsed;
                if remaining.abs() <= step {
                    m.angle = target;
                    m.state = MotionState::Settled;
                } else {
                    m.angle += step.copysign(remaining);
                }
                m.drive_servo(&self.name);
                true
            }

            MotionState::Settled => {
                m.drive_frog(&self.name);
                m.state = MotionState::Idle;
                let event = TurnoutEvent::RouteSet {
                    turnout: self.name.clone(),
                    route: m.route,
                    angle: m.angle,
                };
                drop(m);
                self.sink.emit(&event);
                false
            }
        }
    }

    fn change_route(&self, now: Instant) {
        let mut m = self.lock();
        m.route = m.route.toggled();
        m.state = MotionState::Moving;
        m.last = Some(now);
        let event = TurnoutEvent::RouteChanging {
            turnout: self.name.clone(),
            route: m.route,
        };
        drop(m);
        self.sink.emit(&event);
    }
}
