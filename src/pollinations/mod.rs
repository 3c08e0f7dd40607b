pub mod dispatcher;
pub mod request_builder;

use crate::{
    config::{Config, DeliveryPolicy},
    fetch::{HttpImageFetcher, ImageFetcher},
    models::{GenerationForm, GenerationOutcome, ModelInfo},
    storage::{LocalObjectStore, ObjectStore},
};
use std::sync::Arc;

pub use dispatcher::{Delivery, GenerationDispatcher, RandomSeed, SeedSource};
pub use request_builder::{RequestBuilder, IMAGE_TO_IMAGE_MODEL, TRANSPARENT_MODEL};

pub const DEFAULT_MODEL: &str = "flux";

/// Entry point for image generation against the Pollinations API.
#[derive(Clone)]
pub struct PollinationsClient {
    dispatcher: GenerationDispatcher,
    fetcher: Arc<dyn ImageFetcher>,
    media: Option<Arc<LocalObjectStore>>,
}

impl PollinationsClient {
    pub fn new(config: &Config) -> Self {
        Self::with_fetcher(config, Arc::new(HttpImageFetcher::new()))
    }

    /// Same as [`PollinationsClient::new`] with a caller-supplied fetcher for
    /// both rehosting and the download proxy.
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let builder = RequestBuilder::new(config.pollinations.base_url.clone());
        let mut dispatcher = GenerationDispatcher::new(builder);
        if !config.pollinations.cache_bust {
            dispatcher = dispatcher.without_cache_bust();
        }

        let media = match config.delivery {
            DeliveryPolicy::PassThrough => None,
            DeliveryPolicy::Rehost => {
                let store = Arc::new(LocalObjectStore::new(
                    config.rehost.dir.clone(),
                    config.public_base_url(),
                ));
                let object_store: Arc<dyn ObjectStore> = store.clone();
                dispatcher = dispatcher.with_delivery(Delivery::Rehost {
                    fetcher: fetcher.clone(),
                    store: object_store,
                });
                Some(store)
            }
        };

        Self {
            dispatcher,
            fetcher,
            media,
        }
    }

    pub async fn generate(&self, form: &GenerationForm) -> GenerationOutcome {
        self.dispatcher.dispatch(form).await
    }

    pub fn dispatcher(&self) -> &GenerationDispatcher {
        &self.dispatcher
    }

    pub fn fetcher(&self) -> &Arc<dyn ImageFetcher> {
        &self.fetcher
    }

    /// Store holding rehosted images, present only under the rehost policy.
    pub fn media(&self) -> Option<&Arc<LocalObjectStore>> {
        self.media.as_ref()
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: DEFAULT_MODEL.to_string(),
                name: "Flux".to_string(),
                description: "General purpose text-to-image model".to_string(),
                default: true,
            },
            ModelInfo {
                id: IMAGE_TO_IMAGE_MODEL.to_string(),
                name: "Kontext".to_string(),
                description: "Edits a supplied image following the prompt".to_string(),
                default: false,
            },
            ModelInfo {
                id: "turbo".to_string(),
                name: "Turbo".to_string(),
                description: "Fast, lower fidelity generation".to_string(),
                default: false,
            },
            ModelInfo {
                id: TRANSPARENT_MODEL.to_string(),
                name: "GPT Image".to_string(),
                description: "Supports transparent backgrounds".to_string(),
                default: false,
            },
        ]
    }
}
