use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::CONTENT_TYPE, Client};

use crate::error::{ArtyError, Result};

/// Image bytes plus the content type the source reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedImage {
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }

        log::debug!("Fetching image from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArtyError::upstream(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("").to_string();
            return Err(ArtyError::upstream(Some(status.as_u16()), reason));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArtyError::upstream(Some(status.as_u16()), e.to_string()))?;

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

/// Decodes `data:<mime>;base64,<payload>` inline instead of going to the network.
pub fn decode_data_uri(uri: &str) -> Result<FetchedImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ArtyError::upstream(None, "Not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ArtyError::upstream(None, "Malformed data URI"))?;
    let meta = meta
        .strip_suffix(";base64")
        .ok_or_else(|| ArtyError::upstream(None, "Only base64 data URIs are supported"))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ArtyError::upstream(None, format!("Invalid base64 payload: {}", e)))?;
    let content_type = if meta.is_empty() {
        None
    } else {
        Some(meta.to_string())
    };

    Ok(FetchedImage {
        bytes,
        content_type,
    })
}
