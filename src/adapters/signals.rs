//! OS termination signals → [`ShutdownCoordinator`].
//!
//! `signal-hook` turns SIGINT/SIGTERM into an iterator read by a dedicated
//! `signals` thread, so the coordinator runs in ordinary thread context
//! and may block on the exit event.  A forced exit terminates the process
//! from that thread with the shutdown-timeout status.

use std::io;
use std::process;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::info;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::error::FatalReason;
use crate::shutdown::{ShutdownCoordinator, ShutdownPhase};

/// Register SIGINT and SIGTERM and start the listener thread.
pub fn spawn_signal_listener(coordinator: Arc<ShutdownCoordinator>) -> io::Result<JoinHandle<()>> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new().name("signals".into()).spawn(move || {
        for signal in signals.forever() {
            info!("Received signal {}", signal);
            if coordinator.request_shutdown() == Some(ShutdownPhase::ForcedExit) {
                process::exit(i32::from(FatalReason::ShutdownTimeout.exit_code()));
            }
        }
    })
}
