use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{
    error::{ArtyError, Result},
    models::{
        GenerationFlags, GenerationForm, GenerationMode, GenerationRequest, ImageOptions,
        LooseValue, RequestDescriptor,
    },
};

/// Model the upstream uses for editing a supplied image.
pub const IMAGE_TO_IMAGE_MODEL: &str = "kontext";
/// Model the upstream uses for transparent backgrounds.
pub const TRANSPARENT_MODEL: &str = "gptimage";

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turns a raw form into a typed request.
    ///
    /// Checks run in a fixed order: prompt, mode, then image.
    pub fn validate(&self, form: &GenerationForm) -> Result<GenerationRequest> {
        let prompt = form
            .prompt
            .as_ref()
            .map(LooseValue::to_string)
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ArtyError::validation("prompt required"))?;

        let mode: GenerationMode = form
            .mode
            .as_ref()
            .and_then(LooseValue::as_text)
            .ok_or_else(|| ArtyError::validation("invalid mode"))?
            .parse()?;

        let image = form.image.as_ref().and_then(LooseValue::as_text);

        let mut options = ImageOptions {
            width: positive(&form.width),
            height: positive(&form.height),
            seed: positive(&form.seed),
            model: form.model.as_ref().and_then(LooseValue::as_text),
            transparent: flag(&form.transparent),
            image: None,
            flags: GenerationFlags {
                nologo: flag(&form.nologo),
                private: flag(&form.private),
                enhance: flag(&form.enhance),
                safe: flag(&form.safe),
            },
        };

        match mode {
            GenerationMode::TextToImage => {
                options.image = image;
                Ok(GenerationRequest::TextToImage { prompt, options })
            }
            GenerationMode::ImageToImage => {
                let image = image.ok_or_else(|| ArtyError::validation("image required"))?;
                Ok(GenerationRequest::ImageToImage {
                    prompt,
                    image,
                    options,
                })
            }
            GenerationMode::TransparentBackground => Ok(GenerationRequest::TransparentBackground {
                prompt,
                seed: options.seed,
            }),
        }
    }

    pub fn build(&self, request: &GenerationRequest) -> RequestDescriptor {
        match request {
            GenerationRequest::TextToImage { prompt, options } => self.encode(prompt, options),
            GenerationRequest::ImageToImage {
                prompt,
                image,
                options,
            } => {
                let combined = format!("{} {}", image, prompt);
                let options = ImageOptions {
                    model: Some(IMAGE_TO_IMAGE_MODEL.to_string()),
                    ..options.clone()
                };
                self.encode(&combined, &options)
            }
            GenerationRequest::TransparentBackground { prompt, seed } => {
                let options = ImageOptions {
                    seed: *seed,
                    model: Some(TRANSPARENT_MODEL.to_string()),
                    transparent: true,
                    ..Default::default()
                };
                self.encode(prompt, &options)
            }
        }
    }

    /// Validates and builds in one step.
    pub fn build_from_form(&self, form: &GenerationForm) -> Result<RequestDescriptor> {
        let request = self.validate(form)?;
        Ok(self.build(&request))
    }

    fn encode(&self, prompt: &str, options: &ImageOptions) -> RequestDescriptor {
        let mut params: Vec<(&'static str, String)> = Vec::new();

        if let Some(width) = options.width {
            params.push(("width", width.to_string()));
        }
        if let Some(height) = options.height {
            params.push(("height", height.to_string()));
        }
        if let Some(seed) = options.seed {
            params.push(("seed", seed.to_string()));
        }
        if let Some(model) = &options.model {
            params.push(("model", model.clone()));
        }
        if options.transparent {
            params.push(("transparent", "true".to_string()));
        }
        if let Some(image) = &options.image {
            params.push(("image", image.clone()));
        }
        let flags = &options.flags;
        for (name, on) in [
            ("nologo", flags.nologo),
            ("private", flags.private),
            ("enhance", flags.enhance),
            ("safe", flags.safe),
        ] {
            if on {
                params.push((name, "true".to_string()));
            }
        }

        RequestDescriptor {
            endpoint: format!("{}/prompt/{}", self.base_url, encode_component(prompt)),
            params,
        }
    }
}

fn positive(value: &Option<LooseValue>) -> Option<u32> {
    value.as_ref().and_then(LooseValue::as_positive_u32)
}

fn flag(value: &Option<LooseValue>) -> bool {
    value.as_ref().map_or(false, LooseValue::as_flag)
}
