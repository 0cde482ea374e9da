//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one part of the service
//! against mock adapters.  Everything runs on the host with no real
//! hardware required.

mod dispatcher_tests;
mod factory_tests;
mod mock_hw;
mod shutdown_tests;
