use crate::error::Result;
use async_trait::async_trait;

/// String-keyed, string-valued persistence used for client-side state.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;

    async fn health_check(&self) -> Result<bool>;

    fn backend_name(&self) -> &'static str;
}

/// Durable home for rehosted image bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores the bytes and returns the public URL they can be fetched from.
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String>;
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
