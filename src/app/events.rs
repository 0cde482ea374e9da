//! Outbound turnout events.
//!
//! Actuators emit these through the [`EventSink`](super::ports::EventSink)
//! port.  The service's transmit handler serialises them to JSON and logs
//! them; a network adapter would implement the same trait.

use serde::Serialize;

/// Which way the points are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Main,
    Diverging,
}

impl Route {
    pub fn toggled(self) -> Self {
        match self {
            Self::Main => Self::Diverging,
            Self::Diverging => Self::Main,
        }
    }
}

/// Structured events emitted by turnouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnoutEvent {
    /// A route change was commanded; the points are moving.
    RouteChanging { turnout: String, route: Route },

    /// The points settled and the frog was switched.
    RouteSet {
        turnout: String,
        route: Route,
        angle: f32,
    },
}
