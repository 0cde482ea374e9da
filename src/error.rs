//! Error types for the turnout service.
//!
//! Startup failures funnel into [`StartupError`], whose [`FatalReason`]
//! selects the process exit code.  Failures while turning the service
//! section into actuators are [`ServiceError`]s; a rejected `logging`
//! section is a [`LoggingError`], which is never fatal.  Hardware writes
//! report [`OutputError`], which is also the `embedded-hal` error type of
//! every output channel, so servo and frog code never sees bus-specific
//! errors.

use core::fmt;
use std::path::PathBuf;

use embedded_hal::{digital, i2c, pwm};

// ---------------------------------------------------------------------------
// Fatal reasons (process exit codes)
// ---------------------------------------------------------------------------

/// Why the process is terminating abnormally.  The discriminant is the
/// exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FatalReason {
    /// Configuration file exists but is not valid YAML (or unreadable).
    ConfigParse = 1,
    /// Configuration file path does not exist.
    ConfigMissing = 2,
    /// The `logging` section could not be looked up.
    LoggingConfig = 3,
    /// `services.turnout` missing or not a mapping.
    ServiceSection = 4,
    /// Service section present but unusable.
    ServiceInvalid = 5,
    /// The run loop did not exit within the shutdown deadline.
    ShutdownTimeout = 6,
    /// The termination signal handler could not be installed.  Without it
    /// the service cannot be stopped through its shutdown path.
    SignalSetup = 7,
}

impl FatalReason {
    pub const fn exit_code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse => write!(f, "configuration parse error"),
            Self::ConfigMissing => write!(f, "configuration file missing"),
            Self::LoggingConfig => write!(f, "logging configuration error"),
            Self::ServiceSection => write!(f, "service section unreadable"),
            Self::ServiceInvalid => write!(f, "service configuration invalid"),
            Self::ShutdownTimeout => write!(f, "shutdown deadline exceeded"),
            Self::SignalSetup => write!(f, "signal handler setup failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Everything that can stop the service before the run loop starts.
#[derive(Debug)]
pub enum StartupError {
    ConfigMissing(PathBuf),
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigParse(serde_yaml::Error),
    LoggingMissing,
    ServiceSection(&'static str),
    Service(ServiceError),
    /// Registering the SIGINT/SIGTERM handler failed.  The configuration
    /// was fine, so this gets its own status rather than a config code.
    Signals(std::io::Error),
}

impl StartupError {
    /// Map onto the exit-code table.
    pub fn reason(&self) -> FatalReason {
        match self {
            Self::ConfigMissing(_) => FatalReason::ConfigMissing,
            // A file that exists but cannot be read is reported like one
            // that cannot be parsed.
            Self::ConfigRead { .. } | Self::ConfigParse(_) => FatalReason::ConfigParse,
            Self::LoggingMissing => FatalReason::LoggingConfig,
            Self::ServiceSection(_) => FatalReason::ServiceSection,
            Self::Service(_) => FatalReason::ServiceInvalid,
            Self::Signals(_) => FatalReason::SignalSetup,
        }
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigMissing(path) => {
                write!(f, "Config file {} does not exist", path.display())
            }
            Self::ConfigRead { path, source } => {
                write!(f, "Config file {} unreadable: {source}", path.display())
            }
            Self::ConfigParse(e) => write!(f, "Config file is not valid YAML: {e}"),
            Self::LoggingMissing => write!(f, "Config has no `logging` section"),
            Self::ServiceSection(msg) => write!(f, "Service section: {msg}"),
            Self::Service(e) => write!(f, "Service config: {e}"),
            Self::Signals(e) => write!(f, "Signal handler registration failed: {e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigRead { source, .. } | Self::Signals(source) => Some(source),
            Self::ConfigParse(e) => Some(e),
            Self::Service(e) => Some(e),
            Self::ConfigMissing(_) | Self::LoggingMissing | Self::ServiceSection(_) => None,
        }
    }
}

impl From<ServiceError> for StartupError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

// ---------------------------------------------------------------------------
// Service configuration errors
// ---------------------------------------------------------------------------

/// The service section parsed as YAML but cannot be turned into a registry.
#[derive(Debug)]
pub enum ServiceError {
    /// Typed deserialisation of the section failed.
    Malformed(serde_yaml::Error),
    /// A numeric field is out of range.
    InvalidValue { field: String, reason: &'static str },
    /// No provider is registered for this output `type`.
    UnknownOutputType {
        turnout: String,
        output: String,
        tag: String,
    },
    /// A turnout does not name one of the required output roles.
    MissingOutputRole { turnout: String, role: &'static str },
    /// Provider-specific parameters did not deserialise.
    OutputParams {
        turnout: String,
        output: String,
        source: serde_yaml::Error,
    },
    /// The provider could not open or initialise its hardware.
    Output {
        turnout: String,
        output: String,
        source: anyhow::Error,
    },
    /// Touch input registration failed.
    Input(anyhow::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed: {e}"),
            Self::InvalidValue { field, reason } => write!(f, "{field}: {reason}"),
            Self::UnknownOutputType {
                turnout,
                output,
                tag,
            } => write!(f, "{turnout}/{output}: cannot build output type '{tag}'"),
            Self::MissingOutputRole { turnout, role } => {
                write!(f, "{turnout}: no '{role}' output configured")
            }
            Self::OutputParams {
                turnout,
                output,
                source,
            } => write!(f, "{turnout}/{output}: bad parameters: {source}"),
            Self::Output {
                turnout,
                output,
                source,
            } => write!(f, "{turnout}/{output}: {source:#}"),
            Self::Input(e) => write!(f, "touch input: {e:#}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) | Self::OutputParams { source: e, .. } => Some(e),
            Self::Output { source, .. } | Self::Input(source) => Some(&**source),
            _ => None,
        }
    }
}

/// Result alias for the configuration phase.
pub type Result<T> = core::result::Result<T, ServiceError>;

// ---------------------------------------------------------------------------
// Logging configuration errors
// ---------------------------------------------------------------------------

/// Why the `logging` section could not be applied.  Never fatal: the
/// caller falls back to a DEBUG console subscriber.
#[derive(Debug)]
pub enum LoggingError {
    Schema(serde_yaml::Error),
    Filter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    /// A global subscriber is already installed.
    Install(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "invalid logging section: {e}"),
            Self::Filter { directive, source } => {
                write!(f, "invalid filter '{directive}': {source}")
            }
            Self::Install(msg) => write!(f, "cannot install subscriber: {msg}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(e) => Some(e),
            Self::Filter { source, .. } => Some(source),
            Self::Install(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// The underlying I²C transfer failed.
    Bus(i2c::ErrorKind),
    /// Channel index beyond what the controller provides.
    ChannelOutOfRange(u8),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "bus transfer failed: {kind}"),
            Self::ChannelOutOfRange(ch) => write!(f, "channel {ch} out of range"),
        }
    }
}

impl std::error::Error for OutputError {}

impl pwm::Error for OutputError {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

impl digital::Error for OutputError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}
