//! Logging setup
//!
//! Engine operations carry `#[instrument]` spans with `secret_id` fields.
//! Secret values and passwords are never recorded.
//!
//! The subscriber is chosen once per process from `[logging]` in the
//! settings, with the CLI verbosity flags layered on top.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogOutput, LoggingSettings};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum TracingError {
    /// The filter directive or the subscriber was rejected
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// A subscriber is already installed
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// The log file could not be opened
    #[error("Failed to open log file {path}: {source}")]
    FileCreationFailed {
        /// Requested log file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for tracing setup
pub type TracingResult<T> = Result<T, TracingError>;

/// Verbosity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    #[default]
    Warn,
    /// Adds progress messages
    Info,
    /// Adds store-level decisions
    Debug,
    /// Everything
    Trace,
}

impl TracingLevel {
    /// Level selected by a `-v` count: 0 keeps `base`, then info, debug, trace
    #[must_use]
    pub const fn from_verbosity(count: u8, base: Self) -> Self {
        match count {
            0 => base,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for TracingLevel {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(TracingError::InitializationFailed(format!(
                "unknown log level '{other}'"
            ))),
        }
    }
}

impl fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where formatted events are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Standard error
    #[default]
    Stderr,
    /// Appended to a file; parent directories are created
    File {
        /// Log file
        path: PathBuf,
    },
}

/// Subscriber configuration
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Threshold for the crate-scoped default filter
    pub level: TracingLevel,
    /// Destination
    pub output: TracingOutput,
    /// Directive replacing the default filter
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Stderr at `warn`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from `[logging]`
    ///
    /// `log_file` is the resolved log path, used when the settings ask for
    /// file output. An unknown level falls back to `warn`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, log_file: PathBuf) -> Self {
        let output = if settings.logs_to_file() {
            TracingOutput::File { path: log_file }
        } else {
            match settings.output {
                LogOutput::Stdout => TracingOutput::Stdout,
                LogOutput::Stderr | LogOutput::File => TracingOutput::Stderr,
            }
        };

        Self {
            level: settings.level.parse().unwrap_or_default(),
            output,
            filter: settings
                .filter
                .clone()
                .filter(|directive| !directive.trim().is_empty()),
        }
    }

    /// Sets the level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Sets a directive replacing the default filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Directive derived from the level, scoped to the gsecret crates
    #[must_use]
    pub fn default_filter(&self) -> String {
        format!("gsecret={0},gsecret_core={0}", self.level)
    }

    fn env_filter(&self) -> TracingResult<EnvFilter> {
        let directive = self
            .filter
            .clone()
            .unwrap_or_else(|| self.default_filter());
        EnvFilter::try_new(&directive)
            .map_err(|e| TracingError::InitializationFailed(format!("{directive}: {e}")))
    }

    /// Writer for the destination and whether ANSI colours apply
    fn writer(&self) -> TracingResult<(BoxMakeWriter, bool)> {
        match &self.output {
            TracingOutput::Stdout => Ok((BoxMakeWriter::new(std::io::stdout), true)),
            TracingOutput::Stderr => Ok((BoxMakeWriter::new(std::io::stderr), true)),
            TracingOutput::File { path } => {
                let open = || {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        fs::create_dir_all(parent)?;
                    }
                    OpenOptions::new().create(true).append(true).open(path)
                };
                let file = open().map_err(|source| TracingError::FileCreationFailed {
                    path: path.clone(),
                    source,
                })?;
                Ok((BoxMakeWriter::new(Arc::new(file)), false))
            }
        }
    }
}

/// Installs the global subscriber
///
/// # Errors
///
/// Returns `TracingError::AlreadyInitialized` on a second call,
/// `TracingError::FileCreationFailed` if the log file cannot be opened and
/// `TracingError::InitializationFailed` for a bad filter directive.
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let installed = config.env_filter().and_then(|filter| {
        let (writer, ansi) = config.writer()?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()
            .map_err(|e| TracingError::InitializationFailed(e.to_string()))
    });

    if let Err(e) = installed {
        INSTALLED.store(false, Ordering::SeqCst);
        return Err(e);
    }

    tracing::debug!(level = %config.level, output = ?config.output, "Tracing initialized");
    Ok(())
}
