//! Actuator factory — configuration in, frozen registry out.
//!
//! Output `type` tags are resolved through a table of constructor
//! functions.  Adding an output type means adding one
//! [`ProviderDescriptor`] to [`build_provider_table`].
//!
//! ```text
//!  TurnoutConfig ──▶ outputs[] ──[tag lookup]──▶ PwmChannel per name
//!                                                   │
//!                         "servo" ──▶ Servo ────────┤
//!                         "frog"  ──▶ PwmOutputPin ─┴──▶ Turnout
//! ```
//!
//! Any failure aborts the whole build; a partially built registry is
//! never returned.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_yaml::Value;

use super::ports::{Actuator, BusProvider, EventSink, PwmChannel};
use super::registry::ActuatorRegistry;
use crate::config::{OutputConfig, ServiceConfig, TurnoutConfig};
use crate::drivers::frog::PwmOutputPin;
use crate::drivers::pca9685::Pca9685;
use crate::drivers::servo::Servo;
use crate::drivers::turnout::Turnout;
use crate::error::{Result, ServiceError};

pub const SERVO_ROLE: &str = "servo";
pub const FROG_ROLE: &str = "frog";

// ───────────────────────────────────────────────────────────────
// Provider table
// ───────────────────────────────────────────────────────────────

/// Builds one output channel.  Arguments: shared hardware context, owning
/// turnout name, the output entry.
pub type BuildOutput = fn(&mut ProviderContext, &str, &OutputConfig) -> Result<PwmChannel>;

#[derive(Clone, Copy)]
pub struct ProviderDescriptor {
    /// Value of the output's `type` key.
    pub tag: &'static str,
    pub build: BuildOutput,
}

/// Every output type the service can construct.
pub fn build_provider_table() -> [ProviderDescriptor; 1] {
    [ProviderDescriptor {
        tag: "PCA9685",
        build: build_pca9685,
    }]
}

/// Hardware shared between outputs while the registry is being built.
pub struct ProviderContext {
    buses: Box<dyn BusProvider>,
    pca9685: HashMap<(u8, u8), Arc<Pca9685>>,
}

impl ProviderContext {
    pub fn new(buses: Box<dyn BusProvider>) -> Self {
        Self {
            buses,
            pca9685: HashMap::new(),
        }
    }

    /// The controller at `address` on `bus`, initialised on first use.
    pub fn pca9685(&mut self, bus: u8, address: u8) -> anyhow::Result<Arc<Pca9685>> {
        if let Some(dev) = self.pca9685.get(&(bus, address)) {
            return Ok(Arc::clone(dev));
        }
        let shared = self.buses.bus(bus)?;
        let dev = Pca9685::init(shared, address)
            .with_context(|| format!("initialising PCA9685 0x{address:02x} on i2c-{bus}"))?;
        let dev = Arc::new(dev);
        self.pca9685.insert((bus, address), Arc::clone(&dev));
        Ok(dev)
    }
}

// ── PCA9685 ───────────────────────────────────────────────────

fn default_bus() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Pca9685Params {
    address: u8,
    pin: u8,
    #[serde(default = "default_bus")]
    bus: u8,
}

fn build_pca9685(
    ctx: &mut ProviderContext,
    turnout: &str,
    output: &OutputConfig,
) -> Result<PwmChannel> {
    let params: Pca9685Params = serde_yaml::from_value(Value::Mapping(output.params.clone()))
        .map_err(|source| ServiceError::OutputParams {
            turnout: turnout.to_string(),
            output: output.name.clone(),
            source,
        })?;
    debug!(
        "   - PCA9685 i2c-{} address 0x{:02x} pin {}",
        params.bus, params.address, params.pin
    );

    let hardware = |source: anyhow::Error| ServiceError::Output {
        turnout: turnout.to_string(),
        output: output.name.clone(),
        source,
    };
    let device = ctx.pca9685(params.bus, params.address).map_err(hardware)?;
    let channel = device
        .channel(params.pin)
        .map_err(|e| hardware(e.into()))?;
    Ok(Box::new(channel))
}

// ───────────────────────────────────────────────────────────────
// ActuatorFactory
// ───────────────────────────────────────────────────────────────

pub struct ActuatorFactory {
    providers: HashMap<&'static str, BuildOutput>,
    ctx: ProviderContext,
    sink: Arc<dyn EventSink>,
}

impl ActuatorFactory {
    /// Factory with the standard provider table.
    pub fn new(buses: Box<dyn BusProvider>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_providers(&build_provider_table(), buses, sink)
    }

    pub fn with_providers(
        table: &[ProviderDescriptor],
        buses: Box<dyn BusProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            providers: table.iter().map(|d| (d.tag, d.build)).collect(),
            ctx: ProviderContext::new(buses),
            sink,
        }
    }

    /// Resolve one output through the provider table.
    pub fn build_output(&mut self, turnout: &str, output: &OutputConfig) -> Result<PwmChannel> {
        debug!(" - Output: {} ({})", output.name, output.kind);
        let build = self.providers.get(output.kind.as_str()).ok_or_else(|| {
            ServiceError::UnknownOutputType {
                turnout: turnout.to_string(),
                output: output.name.clone(),
                tag: output.kind.clone(),
            }
        })?;
        build(&mut self.ctx, turnout, output)
    }

    pub fn build_turnout(&mut self, config: &TurnoutConfig, angular_speed: f32) -> Result<Turnout> {
        debug!("Turnout: {}", config.name);
        let mut outputs = HashMap::with_capacity(config.outputs.len());
        for output in &config.outputs {
            let channel = self.build_output(&config.name, output)?;
            outputs.insert(output.name.as_str(), channel);
        }

        let mut take = |role: &'static str| {
            outputs
                .remove(role)
                .ok_or_else(|| ServiceError::MissingOutputRole {
                    turnout: config.name.clone(),
                    role,
                })
        };
        let servo = Servo::new(take(SERVO_ROLE)?);
        let frog = PwmOutputPin::new(take(FROG_ROLE)?);
        for unused in outputs.keys() {
            warn!("{}: output '{}' has no role, ignored", config.name, unused);
        }

        Turnout::new(
            config.name.clone(),
            servo,
            frog,
            config.angles,
            angular_speed,
            Arc::clone(&self.sink),
        )
    }

    /// Build every configured turnout.  Later entries replace earlier
    /// ones with the same name.
    pub fn build_registry(&mut self, config: &ServiceConfig) -> Result<ActuatorRegistry> {
        let mut entries: Vec<(String, Arc<dyn Actuator>)> =
            Vec::with_capacity(config.turnouts.len());
        for turnout in &config.turnouts {
            if entries.iter().any(|(name, _)| *name == turnout.name) {
                warn!("Turnout '{}' configured twice; last entry wins", turnout.name);
            }
            let actuator: Arc<dyn Actuator> =
                Arc::new(self.build_turnout(turnout, config.angular_speed)?);
            entries.push((turnout.name.clone(), actuator));
        }
        let registry: ActuatorRegistry = entries.into_iter().collect();
        info!("Configured {} turnout(s): {:?}", registry.len(), registry);
        Ok(registry)
    }
}
