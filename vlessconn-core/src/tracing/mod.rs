//! Structured logging setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` scoped to the
//! vlessconn crates, and defines the span names shared by the link codec,
//! the profile store, the settings manager and the connection state machine.
//!
//! The identifier in a link is a credential: nothing in this crate logs a
//! full link above `debug`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Level the process-wide subscriber was installed with
static ACTIVE_LEVEL: OnceLock<TracingLevel> = OnceLock::new();

/// Errors from subscriber setup
#[derive(Debug, Error)]
pub enum TracingError {
    /// The subscriber could not be installed
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// A subscriber is already installed for this process
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// The log file could not be opened
    #[error("Failed to create log file {path}: {reason}")]
    FileCreationFailed {
        /// Requested log file
        path: PathBuf,
        /// Underlying I/O error
        reason: String,
    },

    /// A level name that is not one of error/warn/info/debug/trace
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),
}

/// Result type for tracing setup
pub type TracingResult<T> = Result<T, TracingError>;

/// Verbosity of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Normal operation (default)
    #[default]
    Info,
    /// Codec and persistence detail
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    /// Lower-case level name as used in filter directives
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// The matching `tracing` level
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Maps a `-v` count to a level (0 = warn, 1 = info, 2 = debug, 3+ = trace)
    #[must_use]
    pub const fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl FromStr for TracingLevel {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "warning" {
            return Ok(Self::Warn);
        }
        [Self::Error, Self::Warn, Self::Info, Self::Debug, Self::Trace]
            .into_iter()
            .find(|level| level.as_str() == name)
            .ok_or_else(|| TracingError::UnknownLevel(s.to_string()))
    }
}

impl fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Standard error, keeping stdout clean for command output
    #[default]
    Stderr,
    /// A log file, truncated on startup
    File {
        /// Path to the log file
        path: PathBuf,
    },
}

impl TracingOutput {
    fn make_writer(&self) -> TracingResult<BoxMakeWriter> {
        Ok(match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
            Self::File { path } => {
                let file = std::fs::File::create(path).map_err(|e| {
                    TracingError::FileCreationFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?;
                BoxMakeWriter::new(std::sync::Mutex::new(file))
            }
        })
    }

    const fn is_terminal_stream(&self) -> bool {
        !matches!(self, Self::File { .. })
    }
}

/// Subscriber settings
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Level applied to the vlessconn crates
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Include thread IDs in every line, for profiling async hand-offs
    pub profiling_enabled: bool,
    /// Raw `EnvFilter` directive; replaces the level-based default
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Creates a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables thread IDs in log lines
    #[must_use]
    pub const fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling_enabled = enabled;
        self
    }

    /// Sets a raw filter directive
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The filter directive this configuration resolves to
    #[must_use]
    pub fn filter_directive(&self) -> String {
        match &self.filter {
            Some(filter) => filter.clone(),
            None => format!(
                "vlessconn_core={level},vlessconn_cli={level}",
                level = self.level
            ),
        }
    }
}

/// Installs the global subscriber
///
/// Only the first call in a process takes effect.
///
/// # Errors
///
/// Returns `AlreadyInitialized` on a second call, `FileCreationFailed` if
/// the log file cannot be opened, and `InitializationFailed` for a bad
/// filter directive or a subscriber installed by someone else.
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if ACTIVE_LEVEL.set(config.level).is_err() {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = EnvFilter::try_new(config.filter_directive())
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(config.profiling_enabled)
        .with_ansi(config.output.is_terminal_stream())
        .with_writer(config.output.make_writer()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    tracing::debug!(level = %config.level, output = ?config.output, "Tracing initialized");
    Ok(())
}

/// Returns true once [`init_tracing`] has been called
#[must_use]
pub fn is_tracing_initialized() -> bool {
    ACTIVE_LEVEL.get().is_some()
}

/// Level passed to the first [`init_tracing`] call, if any
#[must_use]
pub fn active_level() -> Option<TracingLevel> {
    ACTIVE_LEVEL.get().copied()
}

/// Creates an info-level span with one of the standard [`span_names`]
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Debug-level variant of [`trace_operation!`] for hot paths
#[macro_export]
macro_rules! trace_operation_debug {
    ($name:expr) => {
        tracing::debug_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::debug_span!($name, $($field)*)
    };
}

/// Standard span names
pub mod span_names {
    /// Single link parsing
    pub const URI_PARSE: &str = "uri.parse";
    /// Batch link parsing
    pub const URI_BATCH_PARSE: &str = "uri.batch_parse";
    /// Profile store load
    pub const STORE_LOAD: &str = "store.load";
    /// Profile store write-through
    pub const STORE_PERSIST: &str = "store.persist";
    /// Tunnel establishment
    pub const CONNECTION_ESTABLISH: &str = "connection.establish";
    /// Tunnel teardown
    pub const CONNECTION_DISCONNECT: &str = "connection.disconnect";
    /// Settings load
    pub const CONFIG_LOAD: &str = "config.load";
    /// Settings save
    pub const CONFIG_SAVE: &str = "config.save";
}
