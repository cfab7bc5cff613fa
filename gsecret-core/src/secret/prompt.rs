//! Optional interactive decryption attempt

use secrecy::SecretString;

/// Supplies a decryption password when none is cached locally
pub trait DecryptionPrompt: Send + Sync {
    /// Asks for a password for `id`; `None` or an empty answer declines
    fn request_password(&self, id: &str) -> Option<SecretString>;
}

/// Always declines
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl DecryptionPrompt for NoPrompt {
    fn request_password(&self, _id: &str) -> Option<SecretString> {
        None
    }
}

/// Answers every request with the same password
#[derive(Clone)]
pub struct FixedPassword(SecretString);

impl FixedPassword {
    /// Creates a prompt that always answers with `password`
    #[must_use]
    pub fn new(password: impl Into<SecretString>) -> Self {
        Self(password.into())
    }
}

impl std::fmt::Debug for FixedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FixedPassword([REDACTED])")
    }
}

impl DecryptionPrompt for FixedPassword {
    fn request_password(&self, _id: &str) -> Option<SecretString> {
        Some(self.0.clone())
    }
}
