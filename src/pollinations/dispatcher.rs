use std::sync::Arc;

use rand::Rng;

use crate::{
    error::{ArtyError, Result},
    fetch::ImageFetcher,
    logger,
    models::{FailureKind, GenerationForm, GenerationOutcome},
    pollinations::request_builder::RequestBuilder,
    storage::ObjectStore,
};

/// Seeds drawn for cache busting fall in `0..SEED_RANGE`.
pub const SEED_RANGE: u32 = 1_000_000;

pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSeed;

impl SeedSource for RandomSeed {
    fn next_seed(&self) -> u32 {
        rand::thread_rng().gen_range(0..SEED_RANGE)
    }
}

/// What happens to the upstream URL once it is built.
#[derive(Clone)]
pub enum Delivery {
    PassThrough,
    Rehost {
        fetcher: Arc<dyn ImageFetcher>,
        store: Arc<dyn ObjectStore>,
    },
}

impl Delivery {
    pub fn name(&self) -> &'static str {
        match self {
            Delivery::PassThrough => "pass-through",
            Delivery::Rehost { .. } => "rehost",
        }
    }

    async fn deliver(&self, upstream_url: String) -> Result<String> {
        match self {
            Delivery::PassThrough => Ok(upstream_url),
            Delivery::Rehost { fetcher, store } => {
                let _timer = logger::timer("rehost");
                let image = fetcher.fetch(&upstream_url).await?;
                let content_type = image.content_type_or_default().to_string();
                store.put(image.bytes, &content_type).await
            }
        }
    }
}

/// Runs one generation attempt and folds every failure into the outcome.
#[derive(Clone)]
pub struct GenerationDispatcher {
    builder: RequestBuilder,
    delivery: Delivery,
    seeds: Option<Arc<dyn SeedSource>>,
}

impl GenerationDispatcher {
    pub fn new(builder: RequestBuilder) -> Self {
        Self {
            builder,
            delivery: Delivery::PassThrough,
            seeds: Some(Arc::new(RandomSeed)),
        }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// Turns off cache busting; URLs then depend only on the form.
    pub fn without_cache_bust(mut self) -> Self {
        self.seeds = None;
        self
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub async fn dispatch(&self, form: &GenerationForm) -> GenerationOutcome {
        let prompt = form.prompt_text();

        match self.try_dispatch(form).await {
            Ok(image_url) => {
                log::info!("Generated image for prompt '{}'", prompt);
                GenerationOutcome::success(prompt, image_url)
            }
            Err(e) => {
                let kind = match &e {
                    ArtyError::Validation(_) => {
                        log::warn!("Rejected generation request: {}", e);
                        FailureKind::Validation
                    }
                    ArtyError::UpstreamFetch {
                        status: Some(status),
                        ..
                    } => {
                        log::error!("Generation Error: {}", e);
                        return GenerationOutcome::failure(
                            prompt,
                            FailureKind::Upstream,
                            format!("{} (HTTP {})", e, status),
                        );
                    }
                    ArtyError::UpstreamFetch { status: None, .. } => {
                        log::error!("Generation Error: {}", e);
                        FailureKind::Upstream
                    }
                    ArtyError::Upload(_) => {
                        log::error!("Generation Error: {}", e);
                        FailureKind::Upstream
                    }
                    _ => {
                        log::error!("Generation Error: {}", e);
                        return GenerationOutcome::failure(
                            prompt,
                            FailureKind::Internal,
                            UNKNOWN_ERROR,
                        );
                    }
                };
                GenerationOutcome::failure(prompt, kind, e.to_string())
            }
        }
    }

    async fn try_dispatch(&self, form: &GenerationForm) -> Result<String> {
        let mut request = self.builder.validate(form)?;
        if let Some(seeds) = &self.seeds {
            request.seed_if_absent(seeds.next_seed());
        }

        let descriptor = self.builder.build(&request);
        log::debug!(
            "Built {} request with {} params",
            request.mode(),
            descriptor.params.len()
        );

        let image_url = self.delivery.deliver(descriptor.url()).await?;
        if image_url.is_empty() {
            return Err(ArtyError::Internal(
                "Image generation failed: No image URL was returned.".into(),
            ));
        }
        Ok(image_url)
    }
}
