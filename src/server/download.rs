use actix_web::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    web, HttpResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{error::ArtyError, logger, server::AppState};

pub const FILENAME_PREFIX: &str = "arty-ai";
pub const FILENAME_EXTENSION: &str = "png";

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
}

pub fn attachment_filename() -> String {
    format!(
        "{}-{}.{}",
        FILENAME_PREFIX,
        Utc::now().timestamp_millis(),
        FILENAME_EXTENSION
    )
}

/// `GET /api/download?url=` relays the image as an attachment.
pub async fn download(
    state: web::Data<AppState>,
    query: web::Query<DownloadQuery>,
) -> Result<HttpResponse, ArtyError> {
    let url = query
        .url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ArtyError::validation("Image URL is required"))?;

    let _timer = logger::timer("download proxy");
    let image = state.client.fetcher().fetch(url).await.map_err(|e| {
        log::error!("Download Error: {}", e);
        ArtyError::Proxy(e.to_string())
    })?;

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, image.content_type_or_default().to_string()))
        .insert_header((
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment_filename()),
        ))
        .body(image.bytes))
}
