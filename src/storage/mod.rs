// Storage backend abstraction
// Provides pluggable durable key-value storage for the session keys.
// The session store is the sole writer of those keys; other components read
// session facts through the store's snapshots, never from storage directly.

pub mod memory;

use async_trait::async_trait;

pub use memory::MemoryStorage;

/// Storage errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable key-value storage, scoped per named key.
/// Values survive process restarts (e.g. browser cookies, a settings file).
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Collaborator owning the separately-keyed "selected organization" value.
/// The session store never reads or writes it; it only asks for it to be
/// cleared whenever the session ends.
#[async_trait]
pub trait OrganizationScope: Send + Sync {
    async fn remove_selected_organization(&self) -> Result<(), StorageError>;
}
