//! Turnout service — wires the core together.
//!
//! [`TurnoutService`] owns the frozen registry and the shared scheduler
//! state, and hands out the three execution contexts that use them:
//!
//! ```text
//!  TouchInput ──▶ InputDispatcher ──┐
//!                                   ├──▶ SchedulerState ◀── RunLoop
//!  signals ──▶ ShutdownCoordinator ─┘
//! ```
//!
//! Construction performs all configuration work; nothing is spawned until
//! the caller attaches inputs and calls [`run`](TurnoutService::run).

use std::sync::Arc;
use std::time::Duration;

use log::info;

use super::dispatcher::InputDispatcher;
use super::factory::ActuatorFactory;
use super::ports::{BusProvider, EventSink, TouchInput};
use super::registry::ActuatorRegistry;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::events::SchedulerState;
use crate::scheduler::RunLoop;
use crate::shutdown::ShutdownCoordinator;

pub struct TurnoutService {
    registry: Arc<ActuatorRegistry>,
    state: Arc<SchedulerState>,
    dispatcher: Arc<InputDispatcher>,
    coordinator: Arc<ShutdownCoordinator>,
    update_rate: Duration,
}

impl TurnoutService {
    /// Validate `config` and build every turnout from it.  Fails without
    /// side effects on the first bad entry.
    pub fn from_config(
        config: &ServiceConfig,
        buses: Box<dyn BusProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;
        let update_rate = config.update_rate()?;
        let shutdown_timeout = config.shutdown_timeout()?;
        let registry = ActuatorFactory::new(buses, sink).build_registry(config)?;
        Ok(Self::from_registry(registry, update_rate, shutdown_timeout))
    }

    pub fn from_registry(
        registry: ActuatorRegistry,
        update_rate: Duration,
        shutdown_timeout: Duration,
    ) -> Self {
        let registry = Arc::new(registry);
        let state = Arc::new(SchedulerState::new());
        Self {
            dispatcher: Arc::new(InputDispatcher::new(
                Arc::clone(&registry),
                Arc::clone(&state),
            )),
            coordinator: Arc::new(ShutdownCoordinator::new(
                Arc::clone(&state),
                shutdown_timeout,
            )),
            registry,
            state,
            update_rate,
        }
    }

    pub fn registry(&self) -> &Arc<ActuatorRegistry> {
        &self.registry
    }

    pub fn state(&self) -> &Arc<SchedulerState> {
        &self.state
    }

    pub fn dispatcher(&self) -> &Arc<InputDispatcher> {
        &self.dispatcher
    }

    pub fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }

    /// Route touches from `input` to the turnouts.
    pub fn attach_input(&self, input: &mut dyn TouchInput) -> Result<()> {
        Arc::clone(&self.dispatcher).register(input)
    }

    pub fn run_loop(&self) -> RunLoop {
        RunLoop::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.state),
            self.update_rate,
        )
    }

    /// Block in the run loop until shutdown is requested.
    pub fn run(&self) {
        let mut run_loop = self.run_loop();
        run_loop.run();
        info!("Service stopped after {} cycle(s)", run_loop.cycles());
    }
}
