use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::server::AppState;

pub async fn list_history(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.history.list().await)
}

pub async fn delete_entry(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    match state.history.remove(&id).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => {
            log::warn!("Failed to update history in storage: {}", e);
            HttpResponse::Ok().json(json!({
                "warning": "Could not delete the image from saved history."
            }))
        }
    }
}

pub async fn clear_history(state: web::Data<AppState>) -> HttpResponse {
    match state.history.clear().await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            log::warn!("Failed to clear history from storage: {}", e);
            HttpResponse::Ok().json(json!({
                "warning": "Could not clear saved history."
            }))
        }
    }
}
