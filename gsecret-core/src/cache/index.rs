//! In-memory snapshot of known secret identifiers
//!
//! Position in the sequence is the numeric alias a caller may type instead
//! of the full identifier. The snapshot mirrors the last successful remote
//! listing and is only mutated locally to track writes and deletes the
//! remote store has not seen.

/// Ordered identifier list with alias lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIndex {
    ids: Vec<String>,
    dirty: bool,
}

impl LocalIndex {
    /// Creates an index from a loaded snapshot
    #[must_use]
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids, dirty: false }
    }

    /// Maps a token to an identifier
    ///
    /// A non-negative integer that addresses an entry yields that entry.
    /// Anything else, including out-of-range indices, is returned unchanged.
    #[must_use]
    pub fn resolve<'a>(&'a self, token: &'a str) -> &'a str {
        token
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| self.ids.get(i))
            .map_or(token, String::as_str)
    }

    /// Appends an identifier the remote store does not know about yet
    ///
    /// Returns `false` if it was already tracked.
    pub fn append(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        self.dirty = true;
        true
    }

    /// Removes an identifier whose remote delete could not be confirmed
    ///
    /// Returns `false` if it was not tracked.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|known| known != id);
        let removed = self.ids.len() != before;
        self.dirty |= removed;
        removed
    }

    /// Overwrites the snapshot with an authoritative remote listing
    ///
    /// Always marks the snapshot dirty so an unreadable cache file is rewritten.
    pub fn replace(&mut self, ids: Vec<String>) {
        self.ids = ids;
        self.dirty = true;
    }

    /// Whether the identifier is tracked
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// Identifiers in alias order
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Consumes the index, returning the identifiers
    #[must_use]
    pub fn into_ids(self) -> Vec<String> {
        self.ids
    }

    /// Number of tracked identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether the snapshot changed since it was loaded
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }
}
