//! Local index cache
//!
//! An ordered, on-disk snapshot of known secret identifiers. It serves as the
//! offline listing and as the numeric alias table. The engine loads it at the
//! start of an operation, mutates the in-memory [`LocalIndex`], and persists it
//! at the end through an [`IndexStore`].

mod index;
mod store;

pub use index::LocalIndex;
pub use store::{IndexStore, JsonFileIndexStore, MemoryIndexStore};
