//! Password-based encryption of secret values
//!
//! Values are wrapped before they reach either store and unwrapped after
//! they are read back. [`PasswordCodec`] uses AES-256-GCM with Argon2id key
//! derivation, so a wrong password is reported instead of producing garbage.
//!
//! Envelope layout (text): `gsec1:` + base64(salt ‖ nonce ‖ ciphertext ‖ tag)

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};

/// Prefix identifying a [`PasswordCodec`] envelope
pub const ENVELOPE_PREFIX: &str = "gsec1:";

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Symmetric encrypt/decrypt primitive over text
pub trait EncryptionCodec: Send + Sync {
    /// Wraps `plaintext` under `password`
    ///
    /// # Errors
    /// Returns `CryptoError::Encryption` if the primitive fails.
    fn encrypt(&self, plaintext: &str, password: &str) -> CryptoResult<String>;

    /// Unwraps `ciphertext` with `password`
    ///
    /// # Errors
    /// Returns `CryptoError::InvalidFormat` for input that is not an envelope
    /// and `CryptoError::InvalidPassword` when authentication fails.
    fn decrypt(&self, ciphertext: &str, password: &str) -> CryptoResult<String>;
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl KdfParams {
    /// Cheap parameters for tests only
    #[must_use]
    pub const fn insecure_fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// AES-256-GCM codec keyed by an Argon2id-derived password key
#[derive(Debug, Clone, Default)]
pub struct PasswordCodec {
    params: KdfParams,
}

impl PasswordCodec {
    /// Creates a codec with production parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec with explicit Argon2id parameters
    #[must_use]
    pub const fn with_params(params: KdfParams) -> Self {
        Self { params }
    }

    /// Whether `value` looks like an envelope produced by this codec
    #[must_use]
    pub fn is_envelope(value: &str) -> bool {
        value.starts_with(ENVELOPE_PREFIX)
    }

    fn derive_key(&self, password: &str, salt: &[u8]) -> CryptoResult<[u8; KEY_LEN]> {
        use argon2::{Algorithm, Argon2, Params, Version};

        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| CryptoError::Encryption(format!("Invalid Argon2 params: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; KEY_LEN];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| CryptoError::Encryption(format!("Key derivation failed: {e}")))?;

        Ok(key)
    }

    fn sealing_key(&self, password: &str, salt: &[u8]) -> CryptoResult<LessSafeKey> {
        let mut key = self.derive_key(password, salt)?;
        let unbound = UnboundKey::new(&AES_256_GCM, &key);
        key.zeroize();
        let unbound =
            unbound.map_err(|_| CryptoError::Encryption("Failed to create key".to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl EncryptionCodec for PasswordCodec {
    fn encrypt(&self, plaintext: &str, password: &str) -> CryptoResult<String> {
        let rng = SystemRandom::new();
        let mut salt = [0u8; SALT_LEN];
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut salt)
            .map_err(|_| CryptoError::Encryption("Failed to generate salt".to_string()))?;
        rng.fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::Encryption("Failed to generate nonce".to_string()))?;

        let key = self.sealing_key(password, &salt)?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut sealed = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(nonce, Aad::empty(), &mut sealed)
            .map_err(|_| CryptoError::Encryption("Encryption failed".to_string()))?;

        let mut raw = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
        raw.extend_from_slice(&salt);
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&sealed);

        Ok(format!("{ENVELOPE_PREFIX}{}", BASE64.encode(raw)))
    }

    fn decrypt(&self, ciphertext: &str, password: &str) -> CryptoResult<String> {
        let encoded = ciphertext
            .trim()
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| CryptoError::InvalidFormat("missing envelope prefix".to_string()))?;
        let raw = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidFormat(format!("invalid base64: {e}")))?;

        let tag_len = AES_256_GCM.tag_len();
        if raw.len() < SALT_LEN + NONCE_LEN + tag_len {
            return Err(CryptoError::InvalidFormat("envelope too short".to_string()));
        }

        let (salt, rest) = raw.split_at(SALT_LEN);
        let (nonce_bytes, sealed) = rest.split_at(NONCE_LEN);

        let key = self.sealing_key(password, salt)?;
        let mut nonce_array = [0u8; NONCE_LEN];
        nonce_array.copy_from_slice(nonce_bytes);
        let nonce = Nonce::assume_unique_for_key(nonce_array);

        let mut buffer = sealed.to_vec();
        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut buffer)
            .map_err(|_| CryptoError::InvalidPassword)?;

        let result = String::from_utf8(plaintext.to_vec())
            .map_err(|e| CryptoError::InvalidFormat(format!("plaintext is not UTF-8: {e}")));
        buffer.zeroize();
        result
    }
}
