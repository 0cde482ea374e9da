//! Application core.
//!
//! The registry, factory and dispatcher live here, together with the
//! service that wires them to the run loop.  All interaction with
//! hardware goes through the **port traits** in [`ports`], so the whole
//! core runs against mocks in tests.

pub mod dispatcher;
pub mod events;
pub mod factory;
pub mod ports;
pub mod registry;
pub mod service;
