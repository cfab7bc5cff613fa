//! Persistence for the local index

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};

use super::index::LocalIndex;

/// Loads and saves the index snapshot
///
/// Loading never fails: a missing or unreadable snapshot is an empty index.
pub trait IndexStore: Send + Sync {
    /// Loads the current snapshot
    fn load(&self) -> LocalIndex;

    /// Persists the snapshot
    ///
    /// # Errors
    /// Returns `CacheError` if the snapshot cannot be written.
    fn save(&self, index: &LocalIndex) -> CacheResult<()>;
}

/// Index stored as a JSON array of identifier strings
#[derive(Debug, Clone)]
pub struct JsonFileIndexStore {
    path: PathBuf,
}

impl JsonFileIndexStore {
    /// Creates a store backed by the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IndexStore for JsonFileIndexStore {
    fn load(&self) -> LocalIndex {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Index cache absent, starting empty");
                return LocalIndex::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Index cache unreadable, treating as empty");
                return LocalIndex::default();
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(ids) => LocalIndex::new(ids),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Index cache corrupted, treating as empty");
                LocalIndex::default()
            }
        }
    }

    fn save(&self, index: &LocalIndex) -> CacheResult<()> {
        let json = serde_json::to_string(index.ids())?;
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, json).map_err(io_err)?;
        debug!(path = %self.path.display(), count = index.len(), "Index cache saved");
        Ok(())
    }
}

/// Index held in memory; clones share the same snapshot
#[derive(Debug, Clone, Default)]
pub struct MemoryIndexStore {
    ids: Arc<Mutex<Vec<String>>>,
}

impl MemoryIndexStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with identifiers
    #[must_use]
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Arc::new(Mutex::new(ids.into_iter().map(Into::into).collect())),
        }
    }

    /// Current persisted identifiers
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl IndexStore for MemoryIndexStore {
    fn load(&self) -> LocalIndex {
        LocalIndex::new(self.snapshot())
    }

    fn save(&self, index: &LocalIndex) -> CacheResult<()> {
        *self.ids.lock().unwrap_or_else(PoisonError::into_inner) = index.ids().to_vec();
        Ok(())
    }
}
