//! Cross-thread wake signalling for the run loop.
//!
//! Producers are the touch-input thread (a route change was commanded) and
//! the signal thread (shutdown was requested).  The single consumer is the
//! [`RunLoop`](crate::scheduler::RunLoop), which blocks on the wake event
//! between polling passes.
//!
//! ```text
//! ┌───────────────┐           ┌──────────────┐   wait(timeout)  ┌──────────┐
//! │ Touch thread  │──set()──▶│              │◀─────────────────│          │
//! │               │           │  WakeEvent   │                   │ RunLoop  │
//! │ Signal thread │──set()──▶│ (level flag) │◀─────clear()─────│          │
//! └───────────────┘           └──────────────┘                   └──────────┘
//! ```
//!
//! The event is level-triggered: any number of `set()` calls before the
//! loop observes them collapse into a single wake.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// ── WakeEvent ─────────────────────────────────────────────────

/// Binary, level-triggered, idempotent signal.
#[derive(Debug, Default)]
pub struct WakeEvent {
    flag: Mutex<bool>,
    cond: Condvar,
}

impl WakeEvent {
    pub const fn new() -> Self {
        Self {
            flag: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Raise the flag and wake every waiter.
    pub fn set(&self) {
        let mut flag = self.lock();
        *flag = true;
        self.cond.notify_all();
    }

    /// Lower the flag.
    pub fn clear(&self) {
        *self.lock() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Block until the flag is raised or `timeout` elapses.
    /// `None` waits indefinitely.  Returns the flag state on return, so
    /// `true` means "woken by `set()`" and `false` means "timed out".
    /// The flag is left as-is; the caller clears it.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let guard = self.lock();
        match timeout {
            None => {
                let guard = self
                    .cond
                    .wait_while(guard, |set| !*set)
                    .unwrap_or_else(PoisonError::into_inner);
                *guard
            }
            Some(timeout) => {
                let (guard, _) = self
                    .cond
                    .wait_timeout_while(guard, timeout, |set| !*set)
                    .unwrap_or_else(PoisonError::into_inner);
                *guard
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // A bool cannot be left half-written, so a poisoned lock is still usable.
        self.flag.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── SchedulerState ────────────────────────────────────────────

/// State shared between the run loop, the input dispatcher and the
/// shutdown coordinator.  Handed around as `Arc<SchedulerState>`.
#[derive(Debug)]
pub struct SchedulerState {
    alive: AtomicBool,
    wake: WakeEvent,
    exit_wake: WakeEvent,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerState {
    pub const fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            wake: WakeEvent::new(),
            exit_wake: WakeEvent::new(),
        }
    }

    /// Liveness flag polled by the run loop once per iteration.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Clear the liveness flag.  Returns `true` only for the call that
    /// actually flipped it.
    pub fn request_stop(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }

    /// Interrupts the run loop's wait.
    pub fn wake(&self) -> &WakeEvent {
        &self.wake
    }

    /// Raised once by the run loop after it has fully exited.
    pub fn exit_wake(&self) -> &WakeEvent {
        &self.exit_wake
    }
}
