//! Turnout Service — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ConsoleTouchInput  LogEventSink   I²C bus provider   signals  │
//! │  (TouchInput)       (EventSink)    (BusProvider)      (SIGINT/ │
//! │                                                        SIGTERM)│
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  TurnoutService                                        │    │
//! │  │  ActuatorRegistry · InputDispatcher · RunLoop          │    │
//! │  │  ShutdownCoordinator                                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup failures exit with the status of their [`FatalReason`]; a
//! shutdown that misses its deadline exits with 6 from the signal thread.
//!
//! [`FatalReason`]: turnout_service::error::FatalReason

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use turnout_service::adapters::console_touch::ConsoleTouchInput;
use turnout_service::adapters::i2c;
use turnout_service::adapters::log_sink::LogEventSink;
use turnout_service::adapters::signals::spawn_signal_listener;
use turnout_service::app::service::TurnoutService;
use turnout_service::config::ConfigDocument;
use turnout_service::error::StartupError;
use turnout_service::logging;

#[derive(Debug, Parser)]
#[command(version, about = "Model railroad turnout service")]
struct Cli {
    /// Application configuration
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Failures before the logging section was applied still need
            // a subscriber to be visible.
            logging::init_fallback();
            let reason = e.reason();
            error!("{}", e);
            error!("Exiting: {} (status {})", reason, reason.exit_code());
            ExitCode::from(reason.exit_code())
        }
    }
}

fn run(path: &Path) -> Result<(), StartupError> {
    // ── 1. Configuration file ─────────────────────────────────
    let doc = ConfigDocument::load(path)?;

    // ── 2. Logging (falls back internally) ────────────────────
    logging::configure(doc.logging()?);

    info!("╔══════════════════════════════════════╗");
    info!("║  Turnout Service v{:<19}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!("Config: {}", path.display());

    // ── 3. Turnouts ───────────────────────────────────────────
    let config = doc.service()?;
    let service = TurnoutService::from_config(
        &config,
        i2c::default_provider(),
        Arc::new(LogEventSink::new()),
    )?;

    // ── 4. Communications ─────────────────────────────────────
    let mut touch = ConsoleTouchInput::stdin();
    service.attach_input(&mut touch)?;

    // ── 5. Termination handler ────────────────────────────────
    spawn_signal_listener(Arc::clone(service.coordinator())).map_err(StartupError::Signals)?;

    // ── 6. Run loop (blocks until shutdown) ───────────────────
    service.run();
    Ok(())
}
