pub mod download;
pub mod error;
pub mod generate;
pub mod history;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use serde_json::json;

use crate::{
    config::Config,
    error::{ArtyError, Result},
    pollinations::PollinationsClient,
    storage::{HistoryStore, KeyValueStore, ObjectStore, StorageManager},
};

/// Image-to-image submissions carry whole data URIs in the body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState {
    pub client: PollinationsClient,
    pub history: Arc<HistoryStore>,
    pub storage: Arc<dyn KeyValueStore>,
}

impl AppState {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage = StorageManager::new(config).await?;
        let history = storage.history().await?;

        Ok(Self {
            client: PollinationsClient::new(config),
            history: Arc::new(history),
            storage: storage.storage().clone(),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .app_data(web::JsonConfig::default().limit(MAX_BODY_BYTES))
        .app_data(web::FormConfig::default().limit(MAX_BODY_BYTES))
        .route("/health", web::get().to(health))
        .route("/api/generate", web::post().to(generate::generate))
        .route("/api/download", web::get().to(download::download))
        .route("/api/models", web::get().to(models))
        .route("/api/history", web::get().to(history::list_history))
        .route("/api/history", web::delete().to(history::clear_history))
        .route("/api/history/{id}", web::delete().to(history::delete_entry))
        .route("/media/{key}", web::get().to(media));
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    let storage = state.storage.health_check().await.unwrap_or(false);
    HttpResponse::Ok().json(json!({ "status": "ok", "storage": storage }))
}

async fn models() -> HttpResponse {
    HttpResponse::Ok().json(PollinationsClient::supported_models())
}

async fn media(state: web::Data<AppState>, key: web::Path<String>) -> Result<HttpResponse> {
    let Some(store) = state.client.media() else {
        return Ok(HttpResponse::NotFound().finish());
    };

    match store.get(&key).await? {
        Some(object) => Ok(HttpResponse::Ok()
            .content_type(object.content_type)
            .body(object.bytes)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

pub async fn run(config: Config) -> Result<()> {
    let state = web::Data::new(AppState::from_config(&config).await?);
    let bind = (config.host().to_string(), config.port());

    log::info!("🌐 Listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .bind(bind)
    .map_err(|e| ArtyError::Config(format!("Failed to bind: {}", e)))?
    .run()
    .await
    .map_err(|e| ArtyError::Internal(format!("Server error: {}", e)))
}
