pub mod file;
pub mod history;
pub mod memory;
pub mod object;
pub mod traits;
pub mod upstash;

use crate::{
    config::{Config, HistoryBackend},
    error::{ArtyError, Result},
};
use std::sync::Arc;

use file::FileStore;
use memory::MemoryStore;
use upstash::UpstashStore;

pub use history::{HistoryStore, HISTORY_KEY};
pub use object::LocalObjectStore;
pub use traits::{KeyValueStore, ObjectStore, StoredObject};

/// Picks the key-value backend named by the configuration.
pub struct StorageManager {
    backend: Arc<dyn KeyValueStore>,
}

impl StorageManager {
    pub async fn new(config: &Config) -> Result<Self> {
        let backend: Arc<dyn KeyValueStore> = match config.history_backend {
            HistoryBackend::Memory => Arc::new(MemoryStore::new()),
            HistoryBackend::File => Arc::new(FileStore::new(config.history_file.clone())),
            HistoryBackend::Upstash => {
                let upstash_config = config
                    .upstash
                    .clone()
                    .ok_or_else(|| ArtyError::Config("Upstash config required".into()))?;
                Arc::new(UpstashStore::new(upstash_config).await?)
            }
        };

        log::info!("History backend: {}", backend.backend_name());
        Ok(Self { backend })
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    pub async fn history(&self) -> Result<HistoryStore> {
        HistoryStore::load(self.backend.clone()).await
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_from_config() {
        let manager = StorageManager::new(&Config::new().with_memory_history())
            .await
            .unwrap();
        assert_eq!(manager.storage().backend_name(), "memory");
        assert!(manager.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_upstash_without_config_fails() {
        let mut config = Config::new();
        config.history_backend = HistoryBackend::Upstash;
        let err = StorageManager::new(&config).await.err().unwrap();
        assert!(matches!(err, ArtyError::Config(_)));
    }

    #[tokio::test]
    async fn test_file_backend_feeds_history() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::new().with_history_file(temp.path().join("h.json"));
        let manager = StorageManager::new(&config).await.unwrap();
        let history = manager.history().await.unwrap();
        assert!(history.is_empty().await);
    }
}
