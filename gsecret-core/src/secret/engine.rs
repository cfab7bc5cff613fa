//! Secret resolution engine
//!
//! Orchestrates reads and writes across the remote store and the local
//! fallback (credential store plus index cache). The remote store is the
//! source of truth whenever it answers; local state is written as a
//! durability hedge and consulted when the remote store cannot help.
//!
//! Encryption is applied at the edges: before a value reaches either store
//! and after it is read back. The stores only ever see the wrapped text.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use crate::cache::{IndexStore, LocalIndex};
use crate::error::{CryptoError, EngineError, EngineResult};
use crate::models::{SecretRef, SecretVersion, is_valid_secret_id};

use super::countdown::{CancellationToken, CountdownState, DeleteCountdown};
use super::crypto::{EncryptionCodec, PasswordCodec};
use super::keyring::{CredentialStore, password_namespace, value_namespace};
use super::prompt::DecryptionPrompt;
use super::remote::{CreateStatus, RemoteResult, RemoteSecretStore};

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// The remote secret service
    Remote,
    /// The local credential store
    Local,
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Local => f.write_str("local keyring"),
        }
    }
}

/// Outcome of the decryption step of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decryption {
    /// No password was cached or supplied; the value is returned as stored
    NotAttempted,
    /// The value was decrypted
    Decrypted,
    /// A password was available but did not open the value; the raw stored
    /// text is returned
    Failed(CryptoError),
}

/// A value resolved by [`SecretEngine::get`]
pub struct ResolvedSecret {
    /// Resolved identifier (after alias lookup)
    pub id: String,
    /// Requested version
    pub version: SecretVersion,
    /// Store that answered
    pub source: SecretSource,
    /// Plaintext, or the raw stored text when decryption did not happen
    pub value: SecretString,
    /// Decryption outcome
    pub decryption: Decryption,
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("source", &self.source)
            .field("value", &"[REDACTED]")
            .field("decryption", &self.decryption)
            .finish()
    }
}

/// Where a listing came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    /// Authoritative remote listing; the cache now mirrors it
    Remote,
    /// Remote unavailable; the local cache as it was
    LocalCache {
        /// Why the remote listing was not used
        reason: String,
    },
}

/// Identifier listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Identifiers in alias order
    pub ids: Vec<String>,
    /// Provenance
    pub source: ListingSource,
}

impl Listing {
    /// Returns true when the listing is the offline fallback
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.source, ListingSource::LocalCache { .. })
    }
}

/// Result of [`SecretEngine::add`]
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// Identifier written
    pub id: String,
    /// Version handle when the remote write succeeded
    pub remote_version: Option<String>,
    /// Whether the value was encrypted before storage
    pub protected: bool,
    /// Listing refreshed after the write
    pub listing: Listing,
}

/// Result of [`SecretEngine::remove`]
#[derive(Debug, Clone)]
pub enum RemoveOutcome {
    /// The confirmation window was cancelled
    Aborted {
        /// Identifier that was kept
        id: String,
    },
    /// The delete ran
    Deleted {
        /// Identifier deleted
        id: String,
        /// Whether the remote store confirmed the delete
        remote_deleted: bool,
        /// Listing refreshed after the delete
        listing: Listing,
    },
}

/// The secret resolution engine
pub struct SecretEngine {
    project_id: String,
    remote: Arc<dyn RemoteSecretStore>,
    credentials: Arc<dyn CredentialStore>,
    index_store: Arc<dyn IndexStore>,
    codec: Arc<dyn EncryptionCodec>,
}

impl fmt::Debug for SecretEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretEngine")
            .field("project_id", &self.project_id)
            .field("remote", &self.remote.store_id())
            .field("credentials", &self.credentials.store_id())
            .finish_non_exhaustive()
    }
}

impl SecretEngine {
    /// Creates an engine using [`PasswordCodec`] for protected values
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        remote: Arc<dyn RemoteSecretStore>,
        credentials: Arc<dyn CredentialStore>,
        index_store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            remote,
            credentials,
            index_store,
            codec: Arc::new(PasswordCodec::new()),
        }
    }

    /// Replaces the encryption codec
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn EncryptionCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Project the engine operates on
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Maps a numeric alias to an identifier
    ///
    /// Tokens that are not a valid position in the local index are returned
    /// unchanged.
    #[must_use]
    pub fn resolve(&self, token: &str) -> String {
        self.index_store.load().resolve(token).to_string()
    }

    /// Reads `<id-or-index>[@<version>]`
    ///
    /// Tries the remote store first, then the local credential store. A
    /// cached password decrypts the value without asking; otherwise `prompt`
    /// is offered the chance to supply one. Returns `None` when neither store
    /// holds the secret.
    #[instrument(skip(self, prompt), fields(project = %self.project_id))]
    pub async fn get(&self, token: &str, prompt: &dyn DecryptionPrompt) -> Option<ResolvedSecret> {
        let secret_ref = SecretRef::parse(token);
        let id = self.resolve(&secret_ref.token);
        let version = secret_ref.version;

        let (source, stored) = match self.remote.access_version(&id, &version).await {
            RemoteResult::Found(value) if !value.is_empty() => {
                debug!(secret_id = %id, %version, "Resolved from remote store");
                (SecretSource::Remote, SecretString::from(value))
            }
            other => {
                if let RemoteResult::Unavailable(reason) = &other {
                    debug!(secret_id = %id, %reason, "Remote store unavailable, trying local");
                }
                let local = self.read_local(&value_namespace(&self.project_id), &id).await?;
                debug!(secret_id = %id, "Resolved from local credential store");
                (SecretSource::Local, local)
            }
        };

        let (value, decryption) = self.decrypt_value(&id, stored, prompt).await;

        Some(ResolvedSecret {
            id,
            version,
            source,
            value,
            decryption,
        })
    }

    /// Adds a new secret
    ///
    /// The value (encrypted when `password` is non-empty) is always written
    /// to the local credential store, then to the remote store. If the
    /// remote write fails the identifier is tracked in the local index. The
    /// listing is refreshed before returning.
    ///
    /// # Errors
    /// Returns `EngineError::Conflict` if the identifier already exists
    /// remotely (reported by either the existence check or `create`),
    /// `EngineError::InvalidId` for an identifier outside `[A-Za-z0-9_-]`,
    /// `EngineError::Crypto` if encryption fails, and `EngineError::Cache`
    /// if the index cache cannot be persisted.
    #[instrument(skip(self, plaintext, password), fields(project = %self.project_id, protected = password.is_some()))]
    pub async fn add(
        &self,
        id: &str,
        plaintext: &SecretString,
        password: Option<&SecretString>,
    ) -> EngineResult<AddOutcome> {
        let id = id.trim();
        if !is_valid_secret_id(id) {
            return Err(EngineError::InvalidId(id.to_string()));
        }

        match self.remote.exists(id).await {
            RemoteResult::Found(()) => return Err(EngineError::Conflict(id.to_string())),
            RemoteResult::NotFound => debug!(secret_id = %id, "Secret does not exist remotely"),
            RemoteResult::Unavailable(reason) => {
                debug!(secret_id = %id, %reason, "Existence check unavailable");
            }
        }

        match self.remote.create(id).await {
            RemoteResult::Found(CreateStatus::Created) => {
                debug!(secret_id = %id, "Created remote container");
            }
            RemoteResult::Found(CreateStatus::AlreadyExists) => {
                return Err(EngineError::Conflict(id.to_string()));
            }
            RemoteResult::NotFound | RemoteResult::Unavailable(_) => {
                warn!(secret_id = %id, "Could not create remote container");
            }
        }

        let password = password.filter(|p| !p.expose_secret().is_empty());
        let stored = match password {
            Some(password) => {
                let wrapped = self
                    .codec
                    .encrypt(plaintext.expose_secret(), password.expose_secret())?;
                self.write_local(&password_namespace(&self.project_id), id, password)
                    .await;
                SecretString::from(wrapped)
            }
            None => plaintext.clone(),
        };

        self.write_local(&value_namespace(&self.project_id), id, &stored)
            .await;

        let remote_version = match self.remote.add_version(id, stored.expose_secret()).await {
            RemoteResult::Found(version) => {
                info!(secret_id = %id, %version, "Added remote version");
                Some(version)
            }
            RemoteResult::NotFound | RemoteResult::Unavailable(_) => {
                warn!(secret_id = %id, "Remote write failed, tracking in local index");
                let mut index = self.index_store.load();
                index.append(id);
                self.persist(&index)?;
                None
            }
        };

        let listing = self.list().await?;

        Ok(AddOutcome {
            id: id.to_string(),
            remote_version,
            protected: password.is_some(),
            listing,
        })
    }

    /// Lists identifiers
    ///
    /// A successful remote listing overwrites the local index. Otherwise the
    /// local index is returned as a degraded result.
    ///
    /// # Errors
    /// Returns `EngineError::Cache` if the refreshed index cannot be persisted.
    #[instrument(skip(self), fields(project = %self.project_id))]
    pub async fn list(&self) -> EngineResult<Listing> {
        let mut index = self.index_store.load();

        match self.remote.list().await {
            RemoteResult::Found(ids) => {
                debug!(count = ids.len(), "Remote listing refreshed local index");
                index.replace(ids);
                self.persist(&index)?;
                Ok(Listing {
                    ids: index.into_ids(),
                    source: ListingSource::Remote,
                })
            }
            RemoteResult::NotFound => Ok(Listing {
                ids: index.into_ids(),
                source: ListingSource::LocalCache {
                    reason: "remote listing not found".to_string(),
                },
            }),
            RemoteResult::Unavailable(reason) => {
                debug!(%reason, "Remote listing unavailable, using local index");
                Ok(Listing {
                    ids: index.into_ids(),
                    source: ListingSource::LocalCache { reason },
                })
            }
        }
    }

    /// Deletes `id` after the confirmation window expires
    ///
    /// `id` is used as given; callers resolve aliases with [`Self::resolve`]
    /// first. `on_state` observes the countdown; once it reports
    /// [`CountdownState::Proceeding`] the delete can no longer be cancelled.
    /// If the remote delete cannot be confirmed the identifier is dropped from
    /// the local index. Local credential store entries are kept.
    ///
    /// # Errors
    /// Returns `EngineError::Cache` if the index cannot be persisted.
    #[instrument(skip(self, countdown, cancel, on_state), fields(project = %self.project_id, countdown_secs = countdown.seconds()))]
    pub async fn remove<F>(
        &self,
        id: &str,
        countdown: &mut DeleteCountdown,
        cancel: &CancellationToken,
        on_state: F,
    ) -> EngineResult<RemoveOutcome>
    where
        F: FnMut(CountdownState) + Send,
    {
        if countdown.run(cancel, on_state).await == CountdownState::Aborted {
            info!(secret_id = %id, "Delete aborted");
            return Ok(RemoveOutcome::Aborted { id: id.to_string() });
        }

        let remote_deleted = match self.remote.delete(id).await {
            RemoteResult::Found(()) => {
                info!(secret_id = %id, "Deleted from remote store");
                true
            }
            RemoteResult::NotFound | RemoteResult::Unavailable(_) => {
                warn!(secret_id = %id, "Remote delete failed, dropping from local index");
                let mut index = self.index_store.load();
                index.remove(id);
                self.persist(&index)?;
                false
            }
        };

        let listing = self.list().await?;

        Ok(RemoveOutcome::Deleted {
            id: id.to_string(),
            remote_deleted,
            listing,
        })
    }

    async fn decrypt_value(
        &self,
        id: &str,
        stored: SecretString,
        prompt: &dyn DecryptionPrompt,
    ) -> (SecretString, Decryption) {
        let password = match self
            .read_local(&password_namespace(&self.project_id), id)
            .await
        {
            Some(cached) => {
                debug!(secret_id = %id, "Using cached decryption password");
                Some(cached)
            }
            None => prompt
                .request_password(id)
                .filter(|p| !p.expose_secret().is_empty()),
        };

        let Some(password) = password else {
            return (stored, Decryption::NotAttempted);
        };

        match self
            .codec
            .decrypt(stored.expose_secret(), password.expose_secret())
        {
            Ok(plaintext) => (SecretString::from(plaintext), Decryption::Decrypted),
            Err(e) => {
                warn!(secret_id = %id, error = %e, "Decryption failed, returning stored value");
                (stored, Decryption::Failed(e))
            }
        }
    }

    async fn read_local(&self, namespace: &str, id: &str) -> Option<SecretString> {
        match self.credentials.get(namespace, id).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    store = self.credentials.store_id(),
                    secret_id = %id,
                    error = %e,
                    "Local credential store read failed"
                );
                None
            }
        }
    }

    async fn write_local(&self, namespace: &str, id: &str, value: &SecretString) {
        if let Err(e) = self.credentials.set(namespace, id, value).await {
            warn!(
                store = self.credentials.store_id(),
                secret_id = %id,
                error = %e,
                "Local credential store write failed"
            );
        }
    }

    fn persist(&self, index: &LocalIndex) -> EngineResult<()> {
        if index.is_dirty() {
            self.index_store.save(index)?;
        }
        Ok(())
    }
}
