//! Local credential storage
//!
//! Values and passwords are kept in namespaced `(namespace, key)` slots. The
//! production backend is the system keyring via `secret-tool` (libsecret
//! Secret Service API: GNOME Keyring, KDE Wallet, ...).

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::process::Command;

use crate::error::{SecretError, SecretResult};

/// Application identifier used as the `application` attribute in keyring entries
const APP_ID: &str = "gsecret";

/// Namespace holding (possibly encrypted) secret values for a project
#[must_use]
pub fn value_namespace(project_id: &str) -> String {
    format!("gsecret-value@{project_id}")
}

/// Namespace holding decryption passwords for a project
///
/// Always disjoint from [`value_namespace`] for the same project.
#[must_use]
pub fn password_namespace(project_id: &str) -> String {
    format!("gsecret-password@{project_id}")
}

/// Namespaced key/value persistence
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Short identifier used in logs
    fn store_id(&self) -> &'static str;

    /// Reads a value; `Ok(None)` when the slot is empty
    ///
    /// # Errors
    /// Returns `SecretError` if the backend cannot be queried.
    async fn get(&self, namespace: &str, key: &str) -> SecretResult<Option<SecretString>>;

    /// Writes a value, replacing any previous one
    ///
    /// # Errors
    /// Returns `SecretError` if the backend cannot store the value.
    async fn set(&self, namespace: &str, key: &str, value: &SecretString) -> SecretResult<()>;
}

/// Checks whether `secret-tool` binary is available on the system.
pub async fn is_secret_tool_available() -> bool {
    Command::new("secret-tool")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// System keyring backend driven through `secret-tool`
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl KeyringStore {
    /// Creates a keyring store
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    fn store_id(&self) -> &'static str {
        "libsecret"
    }

    async fn get(&self, namespace: &str, key: &str) -> SecretResult<Option<SecretString>> {
        let output = Command::new("secret-tool")
            .args([
                "lookup",
                "application",
                APP_ID,
                "namespace",
                namespace,
                "key",
                key,
            ])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to run secret-tool: {e}")))?;

        if !output.status.success() {
            return Ok(None);
        }

        // secret-tool prints the stored bytes verbatim
        let value = String::from_utf8_lossy(&output.stdout).into_owned();
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(SecretString::from(value)))
        }
    }

    async fn set(&self, namespace: &str, key: &str, value: &SecretString) -> SecretResult<()> {
        use tokio::io::AsyncWriteExt;

        if !is_secret_tool_available().await {
            return Err(SecretError::BackendUnavailable(
                "secret-tool not found. Install libsecret-tools.".into(),
            ));
        }

        let label = format!("{namespace}/{key}");
        let mut child = Command::new("secret-tool")
            .args([
                "store",
                "--label",
                &label,
                "application",
                APP_ID,
                "namespace",
                namespace,
                "key",
                key,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SecretError::LibSecret(format!("Failed to spawn secret-tool: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(value.expose_secret().as_bytes())
                .await
                .map_err(|e| SecretError::LibSecret(format!("Failed to write secret: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to wait for secret-tool: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SecretError::StoreFailed(format!(
                "secret-tool store failed: {stderr}"
            )));
        }

        Ok(())
    }
}

/// Process-local credential store; clones share the same slots
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    slots: Arc<Mutex<HashMap<(String, String), SecretString>>>,
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("slots", &self.len())
            .finish()
    }
}

impl MemoryCredentialStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a slot without going through the async trait
    #[must_use]
    pub fn peek(&self, namespace: &str, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(namespace.to_string(), key.to_string()))
            .map(|v| v.expose_secret().to_string())
    }

    /// Number of occupied slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no slot is occupied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn store_id(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, namespace: &str, key: &str) -> SecretResult<Option<SecretString>> {
        Ok(self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: &SecretString) -> SecretResult<()> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((namespace.to_string(), key.to_string()), value.clone());
        Ok(())
    }
}
