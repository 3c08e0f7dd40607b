//! Arty AI: prompt-to-image request building on the Pollinations API, with
//! optional rehosting, a download proxy and a persisted generation history.

pub mod config;
pub mod error;
pub mod fetch;
pub mod logger;
pub mod models;
pub mod pollinations;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;

pub use config::{
    Config, DeliveryPolicy, HistoryBackend, PollinationsConfig, RehostConfig, UpstashConfig,
};
pub use error::{ArtyError, Result};
pub use fetch::{FetchedImage, HttpImageFetcher, ImageFetcher};
pub use models::*;
pub use pollinations::{GenerationDispatcher, PollinationsClient, RequestBuilder};
pub use storage::{HistoryStore, KeyValueStore, ObjectStore, StorageManager};
