use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::{ArtyError, Result},
    storage::traits::{ObjectStore, StoredObject},
};

pub const MEDIA_ROUTE: &str = "/media";

/// Writes rehosted images into a directory served under [`MEDIA_ROUTE`].
///
/// Objects are never removed; rehosted links are meant to stay valid.
pub struct LocalObjectStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn object_path(&self, key: &str) -> Option<PathBuf> {
        // Keys are generated by us; anything with a separator or dot-dot is foreign.
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
            && !key.contains("..");
        valid.then(|| self.dir.join(key))
    }
}

pub fn extension_for(content_type: &str) -> &'static str {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ArtyError::Upload(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let key = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        let path = self.dir.join(&key);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ArtyError::Upload(format!("Failed to write {}: {}", path.display(), e)))?;

        log::debug!("Stored {} bytes as {}", bytes.len(), key);
        Ok(format!("{}{}/{}", self.public_base_url, MEDIA_ROUTE, key))
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        let Some(path) = self.object_path(key) else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(StoredObject {
                bytes,
                content_type: content_type_for(key).to_string(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ArtyError::Internal(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let temp = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(temp.path(), "https://cdn.example/");

        let url = store.put(b"png-bytes".to_vec(), "image/png").await.unwrap();
        assert!(url.starts_with("https://cdn.example/media/"));
        assert!(url.ends_with(".png"));

        let key = url.rsplit('/').next().unwrap();
        let object = store.get(key).await.unwrap().unwrap();
        assert_eq!(object.bytes, b"png-bytes");
        assert_eq!(object.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_get_rejects_traversal() {
        let temp = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(temp.path().join("media"), "http://localhost");
        assert!(store.get("../secret").await.unwrap().is_none());
        assert!(store.get("missing.png").await.unwrap().is_none());
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/jpeg; charset=binary"), "jpg");
        assert_eq!(extension_for("application/octet-stream"), "bin");
        assert_eq!(content_type_for("abc.webp"), "image/webp");
    }
}
