//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by serialising each [`TurnoutEvent`] to JSON and
//! writing it to the log at `info`.  A network transmitter would implement
//! the same trait.

use log::{info, warn};

use crate::app::events::TurnoutEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`TurnoutEvent`] as a `TX:` line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }

    /// The JSON payload that [`emit`](EventSink::emit) logs.
    pub fn encode(event: &TurnoutEvent) -> serde_json::Result<String> {
        serde_json::to_string(event)
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &TurnoutEvent) {
        match Self::encode(event) {
            Ok(json) => info!("TX: {}", json),
            Err(e) => warn!("TX: cannot encode {:?}: {}", event, e),
        }
    }
}
