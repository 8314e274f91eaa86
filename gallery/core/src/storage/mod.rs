//! Durable Key-Value Storage
//!
//! The favorites store persists through this abstraction so the engine does
//! not care whether values land in a JSON file, an in-memory map, or a
//! platform store.
//!
//! # Available Backends
//!
//! - **FileStore**: one JSON object file, rewritten atomically (default)
//! - **MemoryStore**: process-local map for ephemeral sessions and tests

mod file;
mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors from a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Value could not be encoded or decoded
    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored value has an unexpected shape
    #[error("stored value for {key} is corrupt: {reason}")]
    Corrupt {
        /// Key whose value is unusable
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Backend refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Async string key-value store
///
/// Writes are full replacements of a key's value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`; deleting an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
