//! Caller-facing secret references: `<identifier-or-index>[@<version>]`

use std::fmt;

/// Separator between the identifier part and the version part
pub const VERSION_SEPARATOR: char = '@';

/// Name of the moving "newest version" alias in the remote store
pub const LATEST_VERSION: &str = "latest";

/// Longest identifier the remote store accepts
pub const MAX_SECRET_ID_LEN: usize = 255;

/// Returns true if `id` only uses `[A-Za-z0-9_-]` and fits the length limit
///
/// Identifiers end up as a remote resource path segment, so anything else
/// (`/`, `?`, `%`, whitespace) is rejected rather than escaped.
#[must_use]
pub fn is_valid_secret_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SECRET_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// A version selector for remote reads
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecretVersion {
    /// The newest enabled version
    #[default]
    Latest,
    /// An explicit version string, normally a positive integer
    Specific(String),
}

impl SecretVersion {
    /// Parses a version part; blank input and `latest` map to [`SecretVersion::Latest`]
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(LATEST_VERSION) {
            Self::Latest
        } else {
            Self::Specific(s.to_string())
        }
    }

    /// Whether the selector can be used as a path segment
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Latest => true,
            Self::Specific(v) => is_valid_secret_id(v),
        }
    }

    /// The form used in remote resource paths
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Latest => LATEST_VERSION,
            Self::Specific(v) => v,
        }
    }
}

impl fmt::Display for SecretVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `get` token before alias resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    /// Literal identifier or numeric alias into the local index
    pub token: String,
    /// Requested version
    pub version: SecretVersion,
}

impl SecretRef {
    /// Splits `token` on the first `@`; a missing version means latest
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match input.split_once(VERSION_SEPARATOR) {
            Some((token, version)) => Self {
                token: token.to_string(),
                version: SecretVersion::parse(version),
            },
            None => Self {
                token: input.to_string(),
                version: SecretVersion::Latest,
            },
        }
    }
}

/// Splits a resolved value into its `user:password` halves for display
///
/// Only the first `:` separates; anything after it belongs to the password.
#[must_use]
pub fn split_credential_pair(value: &str) -> Option<(&str, &str)> {
    value.split_once(':')
}
