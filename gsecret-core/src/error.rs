//! Error types for `gsecret`
//!
//! Remote-store unavailability is deliberately absent from this taxonomy:
//! the remote store reports it through [`crate::secret::RemoteResult`] and the
//! engine falls back to local state instead of failing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the local credential store and the remote transport
#[derive(Debug, Error)]
pub enum SecretError {
    /// The backing tool or service is not available on this system
    #[error("Secret backend unavailable: {0}")]
    BackendUnavailable(String),

    /// libsecret (`secret-tool`) invocation failed
    #[error("libsecret error: {0}")]
    LibSecret(String),

    /// Storing a value failed
    #[error("Failed to store secret: {0}")]
    StoreFailed(String),

    /// The remote client could not be constructed
    #[error("Remote client error: {0}")]
    RemoteClient(String),
}

/// Result type for credential store operations
pub type SecretResult<T> = Result<T, SecretError>;

/// Errors raised while persisting the local index cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure
    #[error("Failed to write index cache {path}: {source}")]
    Io {
        /// Path of the cache file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The in-memory index could not be serialized
    #[error("Failed to serialize index cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for index cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by configuration loading and saving
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be parsed
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// The settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// No project identifier has been configured
    #[error("No project id configured - run 'gsecret setid <PROJECT_ID>' first")]
    MissingProjectId,

    /// No usable configuration directory could be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the password codec
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Input is not a codec envelope
    #[error("Invalid encrypted format: {0}")]
    InvalidFormat(String),

    /// Authentication tag mismatch: wrong password or tampered data
    #[error("Wrong password or corrupted ciphertext")]
    InvalidPassword,

    /// Encryption primitive failure
    #[error("Encryption error: {0}")]
    Encryption(String),
}

/// Result type for codec operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors surfaced by [`crate::secret::SecretEngine`] operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// The identifier already exists in the remote store
    #[error("There is already a secret named: {0}")]
    Conflict(String),

    /// The identifier is empty or otherwise unusable
    #[error("Invalid secret id: {0}")]
    InvalidId(String),

    /// The local index cache could not be persisted
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Encryption of a protected value failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
