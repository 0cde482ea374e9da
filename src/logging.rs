//! Logging setup.
//!
//! Call sites use the `log` macros.  The backend is a `tracing-subscriber`
//! fmt subscriber, which forwards `log` records through its `tracing-log`
//! bridge.
//!
//! ```yaml
//! logging:
//!   level: info              # default filter
//!   filter: "turnout_service=debug,warn"   # EnvFilter syntax, wins over level
//!   format: compact          # full | compact | pretty
//!   ansi: false
//!   target: true
//! ```
//!
//! A section that cannot be applied is not fatal: a DEBUG console
//! subscriber is installed instead and the rejection is logged.

use log::error;
use serde::Deserialize;
use serde_yaml::Value;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::error::LoggingError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub filter: Option<String>,
    pub format: LogFormat,
    pub ansi: bool,
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            filter: None,
            format: LogFormat::Full,
            ansi: true,
            target: true,
        }
    }
}

impl LoggingConfig {
    /// An empty (`logging:`) section means all defaults.
    pub fn from_value(value: &Value) -> Result<Self, LoggingError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value.clone()).map_err(LoggingError::Schema)
    }

    pub fn directive(&self) -> &str {
        self.filter.as_deref().unwrap_or(&self.level)
    }

    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        let directive = self.directive();
        EnvFilter::try_new(directive).map_err(|source| LoggingError::Filter {
            directive: directive.to_string(),
            source,
        })
    }

    /// Install as the global subscriber.
    pub fn install(&self) -> Result<(), LoggingError> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter()?)
            .with_ansi(self.ansi)
            .with_target(self.target);
        let installed = match self.format {
            LogFormat::Full => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
        };
        installed.map_err(|e| LoggingError::Install(e.to_string()))
    }
}

/// Apply the `logging` section, falling back to DEBUG on any failure.
pub fn configure(section: &Value) {
    if let Err(e) = LoggingConfig::from_value(section).and_then(|config| config.install()) {
        init_fallback();
        error!("Logging configuration rejected, using DEBUG fallback: {}", e);
    }
}

/// DEBUG-level console subscriber.  Does nothing if a subscriber is
/// already installed.
pub fn init_fallback() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .try_init();
}
