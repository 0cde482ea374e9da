//! Signal-driven shutdown with a bounded deadline.
//!
//! ```text
//!  Running ──[request]──▶ ShutdownRequested ──[exit_wake]──▶ Stopped
//!                                   │
//!                                   └──────[deadline]──────▶ ForcedExit
//! ```
//!
//! [`request_shutdown`](ShutdownCoordinator::request_shutdown) is called
//! from the signal thread.  It only touches the atomic liveness flag and
//! the two wake events, never a lock the run loop might hold across a
//! poll.  What to do with a `ForcedExit` (terminate with status 6) is the
//! caller's decision; the coordinator itself never exits the process.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::events::SchedulerState;

/// Deadline used when the configuration does not override it.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownPhase {
    Running = 0,
    ShutdownRequested = 1,
    /// The run loop signalled exit within the deadline.
    Stopped = 2,
    /// The deadline elapsed first.
    ForcedExit = 3,
}

impl ShutdownPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Running,
            1 => Self::ShutdownRequested,
            2 => Self::Stopped,
            _ => Self::ForcedExit,
        }
    }

    /// `true` for `Stopped` and `ForcedExit`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::ForcedExit)
    }
}

pub struct ShutdownCoordinator {
    state: Arc<SchedulerState>,
    phase: AtomicU8,
    deadline: Duration,
}

impl ShutdownCoordinator {
    pub fn new(state: Arc<SchedulerState>, deadline: Duration) -> Self {
        Self {
            state,
            phase: AtomicU8::new(ShutdownPhase::Running as u8),
            deadline,
        }
    }

    pub fn phase(&self) -> ShutdownPhase {
        ShutdownPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Stop the run loop and wait up to the deadline for it to exit.
    ///
    /// Returns the terminal phase reached, or `None` if a shutdown was
    /// already in progress (repeat signals are ignored).
    pub fn request_shutdown(&self) -> Option<ShutdownPhase> {
        if self
            .phase
            .compare_exchange(
                ShutdownPhase::Running as u8,
                ShutdownPhase::ShutdownRequested as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            warn!("Shutdown already in progress ({:?})", self.phase());
            return None;
        }

        info!("Shutdown requested, waiting up to {:?}", self.deadline);
        let started = Instant::now();
        self.state.request_stop();
        self.state.wake().set();

        let next = if self.state.exit_wake().wait(Some(self.deadline)) {
            info!("Run loop stopped after {:?}", started.elapsed());
            ShutdownPhase::Stopped
        } else {
            error!("Run loop still busy after {:?}, forcing exit", self.deadline);
            ShutdownPhase::ForcedExit
        };
        self.phase.store(next as u8, Ordering::Release);
        Some(next)
    }
}
