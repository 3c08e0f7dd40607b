use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::error::ArtyError;

impl ResponseError for ArtyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ArtyError::Validation(_) => StatusCode::BAD_REQUEST,
            ArtyError::UpstreamFetch { .. } | ArtyError::Upload(_) => StatusCode::BAD_GATEWAY,
            ArtyError::Proxy(_)
            | ArtyError::Persistence(_)
            | ArtyError::Config(_)
            | ArtyError::Serialization(_)
            | ArtyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text bodies; browsers show these directly on a failed download.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ArtyError::validation("Image URL is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ArtyError::Proxy("Failed to fetch image: Not Found".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ArtyError::upstream(Some(503), "Service Unavailable").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
