use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    error::{ArtyError, Result},
    models::HistoryEntry,
    storage::traits::KeyValueStore,
};

pub const HISTORY_KEY: &str = "arty-ai-history";

/// Newest-first log of past generations.
///
/// The full list is read once in [`HistoryStore::load`] and rewritten on every
/// mutation. When a write fails the in-memory list keeps the change and the
/// caller gets `ArtyError::Persistence` back as a soft error.
pub struct HistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
    backend: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub async fn load(backend: Arc<dyn KeyValueStore>) -> Result<Self> {
        let entries = match backend.get(HISTORY_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    log::error!("Failed to load history from {}: {}", backend.backend_name(), e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to read history from {}: {}", backend.backend_name(), e);
                Vec::new()
            }
        };

        log::info!(
            "Loaded {} history entries from {} store",
            entries.len(),
            backend.backend_name()
        );

        Ok(Self {
            entries: Mutex::new(entries),
            backend,
        })
    }

    pub async fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(0, entry);
        self.persist(&entries).await
    }

    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    /// Removes the entry with `id`. Returns whether anything was removed.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.persist(&entries).await.map(|_| true)
    }

    pub async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.backend.delete(HISTORY_KEY).await.map_err(|e| {
            log::error!("Failed to clear history: {}", e);
            ArtyError::Persistence(e.to_string())
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries).map_err(|e| {
            log::error!("Failed to encode history: {}", e);
            ArtyError::Persistence(e.to_string())
        })?;
        self.backend.set(HISTORY_KEY, &raw).await.map_err(|e| {
            log::error!("Failed to save history: {}", e);
            ArtyError::Persistence(e.to_string())
        })
    }
}
