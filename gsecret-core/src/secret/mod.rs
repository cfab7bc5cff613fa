//! Secret storage and resolution
//!
//! This module provides the collaborators the engine orchestrates and the
//! engine itself:
//!
//! - [`RemoteSecretStore`] - authoritative remote service ([`GcpSecretManager`])
//! - [`CredentialStore`] - local namespaced storage ([`KeyringStore`])
//! - [`EncryptionCodec`] - password wrapping of values ([`PasswordCodec`])
//! - [`DeleteCountdown`] - cancellable confirmation window for deletes
//! - [`SecretEngine`] - alias resolution, dual writes, fallback reads and
//!   listing reconciliation

mod countdown;
mod crypto;
mod engine;
mod gcp;
mod keyring;
mod prompt;
mod remote;

pub use countdown::{CancellationToken, CountdownState, DeleteCountdown};
pub use crypto::{ENVELOPE_PREFIX, EncryptionCodec, KdfParams, PasswordCodec};
pub use engine::{
    AddOutcome, Decryption, Listing, ListingSource, RemoveOutcome, ResolvedSecret, SecretEngine,
    SecretSource,
};
pub use gcp::{ACCESS_TOKEN_ENV, GcpSecretManager, TokenSource};
pub use keyring::{
    CredentialStore, KeyringStore, MemoryCredentialStore, is_secret_tool_available,
    password_namespace, value_namespace,
};
pub use prompt::{DecryptionPrompt, FixedPassword, NoPrompt};
pub use remote::{CreateStatus, OfflineRemoteStore, RemoteResult, RemoteSecretStore};
