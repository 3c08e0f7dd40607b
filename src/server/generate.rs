use actix_web::{http::StatusCode, web, Either, HttpResponse};
use serde::Serialize;

use crate::{
    models::{FailureKind, GenerationForm, GenerationOutcome, HistoryEntry},
    server::AppState,
};

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub outcome: GenerationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// `POST /api/generate` accepts JSON or a urlencoded form.
pub async fn generate(
    state: web::Data<AppState>,
    form: Either<web::Json<GenerationForm>, web::Form<GenerationForm>>,
) -> HttpResponse {
    let form = match form {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let outcome = state.client.generate(&form).await;

    let status = match outcome.failure {
        None => StatusCode::OK,
        Some(FailureKind::Validation) => StatusCode::BAD_REQUEST,
        Some(FailureKind::Upstream) => StatusCode::BAD_GATEWAY,
        Some(FailureKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut warning = None;
    if let Some(image_url) = outcome.result.image_url() {
        let entry = HistoryEntry::new(outcome.prompt.clone(), image_url);
        if let Err(e) = state.history.append(entry).await {
            log::warn!("Generation kept out of saved history: {}", e);
            warning = Some("Could not save the image to history.".to_string());
        }
    }

    HttpResponse::build(status).json(GenerateResponse { outcome, warning })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::tests::{test_state, FakeFetcher};
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_json_generation_appends_history() {
        let state = test_state(FakeFetcher::ok()).await;
        let history = state.history.clone();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/generate", web::post().to(generate)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({"mode": "text-to-image", "prompt": "a red fox in snow", "width": 512}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "imageUrl": "https://image.pollinations.ai/prompt/a%20red%20fox%20in%20snow?width=512",
                "prompt": "a red fox in snow"
            })
        );

        let entries = history.list().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt, "a red fox in snow");
    }

    #[actix_web::test]
    async fn test_form_generation() {
        let state = test_state(FakeFetcher::ok()).await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/generate", web::post().to(generate)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_form([
                ("mode", "transparent-bg"),
                ("prompt", "paper crane"),
                ("width", ""),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["imageUrl"],
            "https://image.pollinations.ai/prompt/paper%20crane?model=gptimage&transparent=true"
        );
    }

    #[actix_web::test]
    async fn test_validation_error_is_400_and_not_recorded() {
        let state = test_state(FakeFetcher::ok()).await;
        let history = state.history.clone();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/generate", web::post().to(generate)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({"mode": "image-to-image", "prompt": "fox"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "image required", "prompt": "fox"}));
        assert!(history.is_empty().await);
    }

    #[actix_web::test]
    async fn test_non_string_fields_get_error_envelope() {
        let state = test_state(FakeFetcher::ok()).await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/api/generate", web::post().to(generate)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({"mode": 1, "prompt": "fox"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "invalid mode", "prompt": "fox"}));

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({"mode": "image-to-image", "prompt": true}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "image required", "prompt": "true"}));
    }
}
