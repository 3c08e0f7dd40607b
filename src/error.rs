use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtyError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to fetch image: {message}")]
    UpstreamFetch {
        status: Option<u16>,
        message: String,
    },
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("{0}")]
    Proxy(String),
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArtyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ArtyError::Validation(msg.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        ArtyError::UpstreamFetch {
            status,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ArtyError::Validation(_))
    }
}

impl From<serde_json::Error> for ArtyError {
    fn from(e: serde_json::Error) -> Self {
        ArtyError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArtyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = ArtyError::validation("prompt required");
        assert_eq!(err.to_string(), "prompt required");
        assert!(err.is_validation());
    }

    #[test]
    fn upstream_error_carries_status() {
        let err = ArtyError::upstream(Some(404), "Not Found");
        assert_eq!(err.to_string(), "Failed to fetch image: Not Found");
        assert!(matches!(err, ArtyError::UpstreamFetch { status: Some(404), .. }));
    }
}
