//! CLI error types and exit codes.

use gsecret_core::error::{ConfigError, EngineError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, IO
    pub const GENERAL_ERROR: i32 = 1;
    /// The secret already exists in the remote store
    pub const CONFLICT: i32 = 2;
    /// The operation was aborted by the user
    pub const ABORTED: i32 = 3;
    /// Interrupted by Ctrl+C after a delete was committed
    pub const INTERRUPTED: i32 = 130;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secret store error
    #[error("Secret error: {0}")]
    Secret(String),

    /// The secret already exists remotely
    #[error("There is already a secret named: {0}")]
    Conflict(String),

    /// Aborted by the user
    #[error("{0}")]
    Aborted(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Conflict(id) => Self::Conflict(id),
            EngineError::InvalidId(id) => Self::InvalidInput(format!("invalid secret id '{id}'")),
            other => Self::Secret(other.to_string()),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, IO)
    /// - 2: Conflict (secret already exists)
    /// - 3: Aborted (cancelled countdown, password mismatch)
    /// - 130: Ctrl+C after a delete was committed (exits directly)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Conflict(_) => exit_codes::CONFLICT,
            Self::Aborted(_) => exit_codes::ABORTED,
            Self::Config(_) | Self::Secret(_) | Self::InvalidInput(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}
