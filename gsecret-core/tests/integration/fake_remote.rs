//! Scripted in-memory remote store

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use gsecret_core::models::SecretVersion;
use gsecret_core::secret::{CreateStatus, RemoteResult, RemoteSecretStore};

#[derive(Debug, Default)]
struct State {
    online: bool,
    secrets: BTreeMap<String, Vec<String>>,
    order: Vec<String>,
    calls: Vec<String>,
    fail_exists: bool,
    fail_add_version: bool,
    fail_delete: bool,
}

/// Remote store whose reachability can be toggled between calls
#[derive(Debug, Clone)]
pub struct FakeRemote {
    state: Arc<Mutex<State>>,
}

impl FakeRemote {
    pub fn online() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                online: true,
                ..State::default()
            })),
        }
    }

    pub fn offline() -> Self {
        let remote = Self::online();
        remote.set_online(false);
        remote
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn set_online(&self, online: bool) {
        self.with_state(|s| s.online = online);
    }

    /// Makes only the existence check time out
    pub fn fail_exists(&self, fail: bool) {
        self.with_state(|s| s.fail_exists = fail);
    }

    pub fn fail_add_version(&self, fail: bool) {
        self.with_state(|s| s.fail_add_version = fail);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.with_state(|s| s.fail_delete = fail);
    }

    /// Seeds a secret with one version, bypassing the call log
    pub fn seed(&self, id: &str, value: &str) {
        self.with_state(|s| {
            if !s.secrets.contains_key(id) {
                s.order.push(id.to_string());
            }
            s.secrets
                .entry(id.to_string())
                .or_default()
                .push(value.to_string());
        });
    }

    pub fn ids(&self) -> Vec<String> {
        self.with_state(|s| s.order.clone())
    }

    pub fn versions(&self, id: &str) -> Vec<String> {
        self.with_state(|s| s.secrets.get(id).cloned().unwrap_or_default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.with_state(|s| s.calls.clone())
    }

    fn record(&self, call: String) -> bool {
        self.with_state(|s| {
            s.calls.push(call);
            s.online
        })
    }
}

fn down<T>() -> RemoteResult<T> {
    RemoteResult::Unavailable("connection refused".to_string())
}

#[async_trait]
impl RemoteSecretStore for FakeRemote {
    fn store_id(&self) -> &'static str {
        "fake"
    }

    async fn list(&self) -> RemoteResult<Vec<String>> {
        if !self.record("list".into()) {
            return down();
        }
        RemoteResult::Found(self.ids())
    }

    async fn exists(&self, id: &str) -> RemoteResult<()> {
        if !self.record(format!("exists {id}")) {
            return down();
        }
        self.with_state(|s| {
            if s.fail_exists {
                down()
            } else if s.secrets.contains_key(id) {
                RemoteResult::Found(())
            } else {
                RemoteResult::NotFound
            }
        })
    }

    async fn create(&self, id: &str) -> RemoteResult<CreateStatus> {
        if !self.record(format!("create {id}")) {
            return down();
        }
        self.with_state(|s| {
            if s.secrets.contains_key(id) {
                return RemoteResult::Found(CreateStatus::AlreadyExists);
            }
            s.order.push(id.to_string());
            s.secrets.insert(id.to_string(), Vec::new());
            RemoteResult::Found(CreateStatus::Created)
        })
    }

    async fn add_version(&self, id: &str, value: &str) -> RemoteResult<String> {
        if !self.record(format!("add_version {id}")) {
            return down();
        }
        self.with_state(|s| {
            if s.fail_add_version {
                return down();
            }
            match s.secrets.get_mut(id) {
                Some(versions) => {
                    versions.push(value.to_string());
                    RemoteResult::Found(format!("{id}/versions/{}", versions.len()))
                }
                None => RemoteResult::NotFound,
            }
        })
    }

    async fn access_version(&self, id: &str, version: &SecretVersion) -> RemoteResult<String> {
        if !self.record(format!("access_version {id}@{version}")) {
            return down();
        }
        self.with_state(|s| {
            let Some(versions) = s.secrets.get(id) else {
                return RemoteResult::NotFound;
            };
            let value = match version {
                SecretVersion::Latest => versions.last(),
                SecretVersion::Specific(n) => n
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| versions.get(i)),
            };
            value.map_or(RemoteResult::NotFound, |v| RemoteResult::Found(v.clone()))
        })
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        if !self.record(format!("delete {id}")) {
            return down();
        }
        self.with_state(|s| {
            if s.fail_delete {
                return down();
            }
            if s.secrets.remove(id).is_some() {
                s.order.retain(|known| known != id);
                RemoteResult::Found(())
            } else {
                RemoteResult::NotFound
            }
        })
    }
}
