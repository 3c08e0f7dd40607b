use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{
    error::{ArtyError, Result},
    storage::traits::KeyValueStore,
};

/// Keeps every key in one JSON object on disk.
///
/// Each write re-reads the file and only replaces its own key, so two stores
/// pointed at the same path keep each other's keys. Writes to the same key
/// are still last-writer-wins.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_object(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(ArtyError::Persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                log::warn!(
                    "Ignoring unreadable store file {}, starting empty",
                    self.path.display()
                );
                Ok(Map::new())
            }
        }
    }

    async fn write_object(&self, payload: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ArtyError::Persistence(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let body = serde_json::to_string_pretty(&Value::Object(payload.clone()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| ArtyError::Persistence(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            ArtyError::Persistence(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let payload = self.read_object().await?;
        Ok(payload
            .get(key)
            .and_then(Value::as_str)
            .map(String::from))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut payload = self.read_object().await?;
        payload.insert(key.to_string(), Value::String(value.to_string()));
        self.write_object(&payload).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut payload = self.read_object().await?;
        if payload.remove(key).is_none() {
            return Ok(());
        }
        self.write_object(&payload).await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.read_object().await.is_ok())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
