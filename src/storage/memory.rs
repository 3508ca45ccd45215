// In-memory storage backend implementation
// Uses HashMap with Mutex for thread-safe access

use super::{KeyValueStorage, OrganizationScope, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Key under which the host application keeps the selected organization.
pub const SELECTED_ORGANIZATION_KEY: &str = "selected_organization";

/// In-memory storage backend
/// Thread-safe storage using HashMap and Mutex
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage backend
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;

        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;

        values.remove(key);
        Ok(())
    }
}

#[async_trait]
impl OrganizationScope for MemoryStorage {
    async fn remove_selected_organization(&self) -> Result<(), StorageError> {
        self.remove(SELECTED_ORGANIZATION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryStorage::new();

        storage.set("access_token", "abc").await.unwrap();
        assert_eq!(
            storage.get("access_token").await.unwrap(),
            Some("abc".to_string())
        );

        storage.remove("access_token").await.unwrap();
        assert_eq!(storage.get("access_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_absent_key_succeeds() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("never_set").await.is_ok());
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let storage = MemoryStorage::new();

        storage.set("user_data", "old").await.unwrap();
        storage.set("user_data", "new").await.unwrap();

        assert_eq!(
            storage.get("user_data").await.unwrap(),
            Some("new".to_string())
        );
    }

    #[tokio::test]
    async fn test_remove_selected_organization() {
        let storage = MemoryStorage::new();

        storage.set(SELECTED_ORGANIZATION_KEY, "org-42").await.unwrap();
        storage.remove_selected_organization().await.unwrap();

        assert_eq!(storage.get(SELECTED_ORGANIZATION_KEY).await.unwrap(), None);
    }
}
