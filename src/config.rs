//! Service configuration.
//!
//! The YAML document is parsed in two stages.  First it becomes a raw
//! [`serde_yaml::Value`] ([`ConfigDocument`]) so the `logging` and
//! `services.turnout` lookups can fail with their own exit codes.  Then
//! the service section is deserialised into [`ServiceConfig`] and
//! validated.
//!
//! ```yaml
//! logging:
//!   level: info
//! services:
//!   turnout:
//!     update-rate: 0.02
//!     angular-speed: 60.0
//!     turnouts:
//!       - name: A
//!         angles: { main: 80, diverging: 100 }
//!         outputs:
//!           - { name: servo, type: PCA9685, address: 0x40, pin: 0 }
//!           - { name: frog,  type: PCA9685, address: 0x40, pin: 1 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Result, ServiceError, StartupError};
use crate::shutdown::DEFAULT_SHUTDOWN_TIMEOUT;

/// Servo travel limits in degrees.
pub const MAX_ANGLE_DEG: f32 = 180.0;

// ── Raw document ──────────────────────────────────────────────

/// The whole configuration file, parsed but not yet interpreted.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Value,
}

impl ConfigDocument {
    /// Read and parse `path`.
    pub fn load(path: &Path) -> core::result::Result<Self, StartupError> {
        if !path.exists() {
            return Err(StartupError::ConfigMissing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| StartupError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> core::result::Result<Self, StartupError> {
        let root = serde_yaml::from_str(text).map_err(StartupError::ConfigParse)?;
        Ok(Self { root })
    }

    /// The opaque `logging` section.
    pub fn logging(&self) -> core::result::Result<&Value, StartupError> {
        self.root.get("logging").ok_or(StartupError::LoggingMissing)
    }

    /// Deserialise and validate `services.turnout`.
    pub fn service(&self) -> core::result::Result<ServiceConfig, StartupError> {
        let section = self
            .root
            .get("services")
            .ok_or(StartupError::ServiceSection("no `services` key"))?
            .get("turnout")
            .ok_or(StartupError::ServiceSection("no `services.turnout` key"))?;
        if !section.is_mapping() {
            return Err(StartupError::ServiceSection(
                "`services.turnout` is not a mapping",
            ));
        }
        let config: ServiceConfig =
            serde_yaml::from_value(section.clone()).map_err(ServiceError::Malformed)?;
        config.validate()?;
        Ok(config)
    }
}

// ── Typed service section ─────────────────────────────────────

/// `services.turnout`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceConfig {
    /// Poll interval while any turnout is moving (seconds).
    pub update_rate: f64,
    /// Servo speed shared by every turnout (degrees per second).
    pub angular_speed: f32,
    /// How long the shutdown handler waits for the run loop (seconds).
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: f64,
    pub turnouts: Vec<TurnoutConfig>,
}

/// One entry of `turnouts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnoutConfig {
    pub name: String,
    pub angles: RouteAngles,
    pub outputs: Vec<OutputConfig>,
}

/// Servo angles for each route, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteAngles {
    pub main: f32,
    pub diverging: f32,
}

/// A named output.  `type` selects the provider; every other key is
/// handed to that provider untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: Mapping,
}

fn default_shutdown_timeout() -> f64 {
    DEFAULT_SHUTDOWN_TIMEOUT.as_secs_f64()
}

impl ServiceConfig {
    /// Range-check every numeric field.  Output types and roles are
    /// checked later, by the factory.
    pub fn validate(&self) -> Result<()> {
        positive_secs("update-rate", self.update_rate)?;
        positive_secs("shutdown-timeout", self.shutdown_timeout)?;
        if !self.angular_speed.is_finite() || self.angular_speed <= 0.0 {
            return Err(invalid("angular-speed", "must be a positive number"));
        }
        for turnout in &self.turnouts {
            turnout.angles.validate(&turnout.name)?;
        }
        Ok(())
    }

    pub fn update_rate(&self) -> Result<Duration> {
        positive_secs("update-rate", self.update_rate)
    }

    pub fn shutdown_timeout(&self) -> Result<Duration> {
        positive_secs("shutdown-timeout", self.shutdown_timeout)
    }
}

impl RouteAngles {
    fn validate(&self, turnout: &str) -> Result<()> {
        for (route, angle) in [("main", self.main), ("diverging", self.diverging)] {
            if !angle.is_finite() || !(0.0..=MAX_ANGLE_DEG).contains(&angle) {
                return Err(invalid(
                    &format!("{turnout}.angles.{route}"),
                    "must be between 0 and 180 degrees",
                ));
            }
        }
        Ok(())
    }
}

fn positive_secs(field: &str, secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => Ok(d),
        _ => Err(invalid(field, "must be a positive number of seconds")),
    }
}

fn invalid(field: &str, reason: &'static str) -> ServiceError {
    ServiceError::InvalidValue {
        field: field.to_string(),
        reason,
    }
}
