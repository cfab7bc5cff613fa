//! Remote secret store interface
//!
//! The remote service is the source of truth whenever it is reachable. Its
//! methods never fail outright; they report [`RemoteResult::Unavailable`] and
//! the engine falls back to local state.

use async_trait::async_trait;

use crate::models::SecretVersion;

/// Outcome of a remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteResult<T> {
    /// The call succeeded and produced a value
    Found(T),
    /// The service answered and the resource does not exist
    NotFound,
    /// The service could not be reached or refused the request
    Unavailable(String),
}

impl<T> RemoteResult<T> {
    /// Returns true if the call produced a value
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns true if the service was unreachable
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Maps the found value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> RemoteResult<U> {
        match self {
            Self::Found(value) => RemoteResult::Found(f(value)),
            Self::NotFound => RemoteResult::NotFound,
            Self::Unavailable(reason) => RemoteResult::Unavailable(reason),
        }
    }
}

/// What `create` found on the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStatus {
    /// A new, empty container was created
    Created,
    /// The service refused because the identifier is already taken
    AlreadyExists,
}

/// Identifier-addressed, versioned remote secret service
#[async_trait]
pub trait RemoteSecretStore: Send + Sync {
    /// Short identifier used in logs
    fn store_id(&self) -> &'static str;

    /// Lists all secret identifiers in remote-defined order
    async fn list(&self) -> RemoteResult<Vec<String>>;

    /// Checks whether the identifier container exists
    async fn exists(&self, id: &str) -> RemoteResult<()>;

    /// Creates the identifier container without any version
    ///
    /// An identifier that is already taken must be reported as
    /// `Found(CreateStatus::AlreadyExists)`, never as `Unavailable`.
    async fn create(&self, id: &str) -> RemoteResult<CreateStatus>;

    /// Adds a new version holding `value`, returning the version handle
    async fn add_version(&self, id: &str, value: &str) -> RemoteResult<String>;

    /// Reads the payload of a version
    async fn access_version(&self, id: &str, version: &SecretVersion) -> RemoteResult<String>;

    /// Deletes the identifier and all of its versions
    async fn delete(&self, id: &str) -> RemoteResult<()>;
}

/// A remote store that is never reachable
///
/// Used for `--offline` operation; every call takes the local fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemoteStore;

const OFFLINE: &str = "offline mode";

#[async_trait]
impl RemoteSecretStore for OfflineRemoteStore {
    fn store_id(&self) -> &'static str {
        "offline"
    }

    async fn list(&self) -> RemoteResult<Vec<String>> {
        RemoteResult::Unavailable(OFFLINE.into())
    }

    async fn exists(&self, _id: &str) -> RemoteResult<()> {
        RemoteResult::Unavailable(OFFLINE.into())
    }

    async fn create(&self, _id: &str) -> RemoteResult<CreateStatus> {
        RemoteResult::Unavailable(OFFLINE.into())
    }

    async fn add_version(&self, _id: &str, _value: &str) -> RemoteResult<String> {
        RemoteResult::Unavailable(OFFLINE.into())
    }

    async fn access_version(&self, _id: &str, _version: &SecretVersion) -> RemoteResult<String> {
        RemoteResult::Unavailable(OFFLINE.into())
    }

    async fn delete(&self, _id: &str) -> RemoteResult<()> {
        RemoteResult::Unavailable(OFFLINE.into())
    }
}
