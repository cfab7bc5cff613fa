//! `gsecret` Core Library
//!
//! This crate resolves, stores and synchronizes small secret values between
//! an authoritative remote secret service and a local, offline-capable
//! fallback.
//!
//! # Crate Structure
//!
//! - [`models`] - Secret references (`<id-or-index>[@<version>]`)
//! - [`config`] - Application settings and persistence
//! - [`cache`] - Local index cache (listing snapshot and numeric aliases)
//! - [`secret`] - Remote and local stores, encryption, delete countdown and
//!   the [`SecretEngine`]
//! - [`tracing`] - Structured logging setup

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod secret;
pub mod tracing;

pub use cache::{IndexStore, JsonFileIndexStore, LocalIndex, MemoryIndexStore};
pub use config::{AppSettings, CONFIG_DIR_ENV, ConfigManager};
pub use error::{
    CacheError, ConfigError, ConfigResult, CryptoError, EngineError, EngineResult, SecretError,
    SecretResult,
};
pub use models::{SecretRef, SecretVersion, split_credential_pair};
pub use secret::{
    AddOutcome, CancellationToken, CountdownState, CreateStatus, CredentialStore, Decryption,
    DecryptionPrompt, DeleteCountdown, EncryptionCodec, GcpSecretManager, KeyringStore, Listing,
    ListingSource, NoPrompt, OfflineRemoteStore, PasswordCodec, RemoteResult, RemoteSecretStore,
    RemoveOutcome, ResolvedSecret, SecretEngine, SecretSource, TokenSource,
};
pub use crate::tracing::{TracingConfig, TracingLevel, TracingOutput, init_tracing};
