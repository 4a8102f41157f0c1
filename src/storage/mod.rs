//! Key-value persistence boundary for session state.
//!
//! The session layer only ever touches one key, but it talks to storage
//! through the [`SessionStorage`] trait so the backend can be swapped:
//! - [`FileStorage`] — one JSON file per key, atomic whole-value replace
//! - [`MemoryStorage`] — ephemeral, for tests and fallback use
//!
//! Every operation is a single atomic put/get/delete of a whole serialized
//! value; there is no partial-record state to corrupt.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;

/// Failure at the storage boundary.
///
/// Callers in the session layer absorb these (log + degrade); they are typed
/// so the event log can report which operation failed without string parsing.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Async key-value store holding whole serialized records.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch the serialized value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value under `key` with a single atomic put.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value under `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
