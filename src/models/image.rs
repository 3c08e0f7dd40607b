use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::common::LooseValue;
use crate::error::ArtyError;

/// Raw generation form as submitted by a browser form or a JSON client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationForm {
    pub mode: Option<LooseValue>,
    pub prompt: Option<LooseValue>,
    pub width: Option<LooseValue>,
    pub height: Option<LooseValue>,
    pub seed: Option<LooseValue>,
    pub model: Option<LooseValue>,
    pub image: Option<LooseValue>,
    pub transparent: Option<LooseValue>,
    pub nologo: Option<LooseValue>,
    pub private: Option<LooseValue>,
    pub enhance: Option<LooseValue>,
    pub safe: Option<LooseValue>,
}

impl GenerationForm {
    pub fn new(mode: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            mode: Some(LooseValue::Text(mode.into())),
            prompt: Some(LooseValue::Text(prompt.into())),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(LooseValue::Int(width as i64));
        self.height = Some(LooseValue::Int(height as i64));
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(LooseValue::Int(width as i64));
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(LooseValue::Int(seed as i64));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(LooseValue::Text(model.into()));
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(LooseValue::Text(image.into()));
        self
    }

    pub fn with_flag(mut self, flag: &str, value: bool) -> Self {
        let value = Some(LooseValue::Bool(value));
        match flag {
            "transparent" => self.transparent = value,
            "nologo" => self.nologo = value,
            "private" => self.private = value,
            "enhance" => self.enhance = value,
            "safe" => self.safe = value,
            _ => {}
        }
        self
    }

    /// The prompt as submitted, for echoing back in results.
    pub fn prompt_text(&self) -> String {
        self.prompt.as_ref().map(LooseValue::to_string).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    TextToImage,
    ImageToImage,
    TransparentBackground,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::TextToImage => "text-to-image",
            GenerationMode::ImageToImage => "image-to-image",
            GenerationMode::TransparentBackground => "transparent-background",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = ArtyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text-to-image" => Ok(GenerationMode::TextToImage),
            "image-to-image" => Ok(GenerationMode::ImageToImage),
            "transparent-background" | "transparent-bg" => {
                Ok(GenerationMode::TransparentBackground)
            }
            _ => Err(ArtyError::validation("invalid mode")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFlags {
    pub nologo: bool,
    pub private: bool,
    pub enhance: bool,
    pub safe: bool,
}

/// Optional tuning shared by the text and image modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub seed: Option<u32>,
    pub model: Option<String>,
    pub transparent: bool,
    /// Reference image passed as a plain parameter (text-to-image only).
    pub image: Option<String>,
    pub flags: GenerationFlags,
}

/// A validated request. Each mode carries exactly the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    TextToImage {
        prompt: String,
        options: ImageOptions,
    },
    ImageToImage {
        prompt: String,
        image: String,
        options: ImageOptions,
    },
    TransparentBackground {
        prompt: String,
        seed: Option<u32>,
    },
}

impl GenerationRequest {
    pub fn mode(&self) -> GenerationMode {
        match self {
            GenerationRequest::TextToImage { .. } => GenerationMode::TextToImage,
            GenerationRequest::ImageToImage { .. } => GenerationMode::ImageToImage,
            GenerationRequest::TransparentBackground { .. } => {
                GenerationMode::TransparentBackground
            }
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            GenerationRequest::TextToImage { prompt, .. }
            | GenerationRequest::ImageToImage { prompt, .. }
            | GenerationRequest::TransparentBackground { prompt, .. } => prompt,
        }
    }

    pub fn seed(&self) -> Option<u32> {
        match self {
            GenerationRequest::TextToImage { options, .. }
            | GenerationRequest::ImageToImage { options, .. } => options.seed,
            GenerationRequest::TransparentBackground { seed, .. } => *seed,
        }
    }

    /// Fills in a seed only when none was given explicitly.
    pub fn seed_if_absent(&mut self, fresh: u32) {
        match self {
            GenerationRequest::TextToImage { options, .. }
            | GenerationRequest::ImageToImage { options, .. } => {
                options.seed.get_or_insert(fresh);
            }
            GenerationRequest::TransparentBackground { seed, .. } => {
                seed.get_or_insert(fresh);
            }
        }
    }
}

/// Upstream endpoint plus its query parameters in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub endpoint: String,
    pub params: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn url(&self) -> String {
        if self.params.is_empty() {
            return self.endpoint.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{}?{}", self.endpoint, query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationResult {
    Success {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Failure {
        error: String,
    },
}

impl GenerationResult {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            GenerationResult::Success { image_url } => Some(image_url),
            GenerationResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationResult::Success { .. } => None,
            GenerationResult::Failure { error } => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }
}

/// What the dispatcher hands back for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    #[serde(flatten)]
    pub result: GenerationResult,
    pub prompt: String,
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Upstream,
    Internal,
}

impl GenerationOutcome {
    pub fn success(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            result: GenerationResult::Success {
                image_url: image_url.into(),
            },
            prompt: prompt.into(),
            failure: None,
        }
    }

    pub fn failure(prompt: impl Into<String>, kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            result: GenerationResult::Failure {
                error: error.into(),
            },
            prompt: prompt.into(),
            failure: Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "text-to-image".parse::<GenerationMode>().unwrap(),
            GenerationMode::TextToImage
        );
        assert_eq!(
            "transparent-bg".parse::<GenerationMode>().unwrap(),
            GenerationMode::TransparentBackground
        );
        let err = "sketch".parse::<GenerationMode>().unwrap_err();
        assert_eq!(err.to_string(), "invalid mode");
    }

    #[test]
    fn test_result_serializes_one_side_only() {
        let ok = GenerationResult::Success {
            image_url: "https://img".into(),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"imageUrl": "https://img"})
        );
        let failed = GenerationResult::Failure {
            error: "prompt required".into(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "prompt required"})
        );
    }

    #[test]
    fn test_outcome_flattens_result() {
        let outcome = GenerationOutcome::success("fox", "https://img");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"imageUrl": "https://img", "prompt": "fox"})
        );
    }

    #[test]
    fn test_descriptor_without_params_has_no_query() {
        let descriptor = RequestDescriptor {
            endpoint: "https://image.pollinations.ai/prompt/fox".into(),
            params: Vec::new(),
        };
        assert_eq!(descriptor.url(), "https://image.pollinations.ai/prompt/fox");
    }

    #[test]
    fn test_seed_if_absent_keeps_explicit_seed() {
        let mut request = GenerationRequest::TransparentBackground {
            prompt: "logo".into(),
            seed: Some(7),
        };
        request.seed_if_absent(99);
        assert_eq!(request.seed(), Some(7));

        let mut request = GenerationRequest::TextToImage {
            prompt: "logo".into(),
            options: ImageOptions::default(),
        };
        request.seed_if_absent(99);
        assert_eq!(request.seed(), Some(99));
    }
}
