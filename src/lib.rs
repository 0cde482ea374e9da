//! Turnout service library.
//!
//! Exposes the run loop, shutdown coordinator and turnout wiring for the
//! `turnout-service` binary and for integration testing.  Hardware access
//! defaults to a simulated I²C bus; enable `linux-i2c` for `/dev/i2c-N`.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod logging;
pub mod scheduler;
pub mod shutdown;
