// src/handlers.rs
use crate::{AppState, errors::MoodframeError, models::*};
use actix_web::{Error, HttpResponse, web};
use base64::{Engine as _, engine::general_purpose};

const MIN_ANALYZE_CHARS: usize = 3;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        MoodframeError::Validation(format!("Invalid JSON body: {}", err)).into()
    });

    cfg.app_data(json_config)
        .service(
            web::scope("/api")
                .route("/analyze", web::post().to(analyze))
                .route("/generate", web::post().to(generate))
                .route("/history", web::get().to(history)),
        )
        .route("/health", web::get().to(health_check));
}

pub async fn analyze(
    data: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, Error> {
    let text = body.text.trim();
    if text.chars().count() < MIN_ANALYZE_CHARS {
        return Err(MoodframeError::Validation("Text too short".to_string()).into());
    }

    let result = data.pipeline.analyze(text).await?;

    Ok(HttpResponse::Ok().json(AnalyzeResponse::from(&result)))
}

pub async fn generate(
    data: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, Error> {
    let request = body.into_inner();
    let style = match request.style.as_deref() {
        Some(name) => name.parse::<StylePreset>()?,
        None => StylePreset::default(),
    };

    log::info!(
        "Generate request: {:?}, style {}, seed {:?}",
        request.text.chars().take(50).collect::<String>(),
        style,
        request.seed
    );

    let result = data.pipeline.run(&request.text, style, request.seed).await?;

    let image = format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(&result.image)
    );

    Ok(HttpResponse::Ok().json(GenerateResponse {
        id: result.id,
        image,
        prompt_used: result.prompt_used,
        emotion_result: result.emotion.as_ref().map(AnalyzeResponse::from),
        seed: result.seed,
        input_type: result.input_mode,
        style: result.style,
        model: result.model,
        original_text: result.original_text,
        timestamp: result.created_at,
    }))
}

pub async fn history(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let entries: Vec<HistoryEntry> = data
        .pipeline
        .history()
        .recent()
        .iter()
        .map(HistoryEntry::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "entries": entries,
        "count": entries.len()
    })))
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "moodframe",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::emotion_analyzer::tests::{FailingClassifier, FixedClassifier};
    use crate::services::emotion_analyzer::EmotionClassifier;
    use crate::services::image_generator::tests::ScriptedBackend;
    use crate::services::pipeline::tests::pipeline_with;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state(classifier: Arc<dyn EmotionClassifier>, backend: Arc<ScriptedBackend>) -> AppState {
        AppState {
            pipeline: Arc::new(pipeline_with(classifier, backend)),
        }
    }

    fn healthy_state() -> AppState {
        state(
            Arc::new(FixedClassifier::dominant(EmotionLabel::Joy)),
            Arc::new(ScriptedBackend::failing(&[])),
        )
    }

    #[actix_web::test]
    async fn analyze_returns_emotion_breakdown() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(healthy_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(json!({ "text": "I feel happy today!" }))
            .to_request();
        let body: AnalyzeResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.primary_emotion, EmotionLabel::Joy);
        assert_eq!((body.valence, body.arousal), (0.8, 0.7));
        assert_eq!(body.emotions.len(), 7);
        assert_eq!(body.emotions[0].score, 88.0);
    }

    #[actix_web::test]
    async fn analyze_rejects_short_text() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(healthy_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(json!({ "text": " hi " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Validation error");
    }

    #[actix_web::test]
    async fn analyze_upstream_failure_is_bad_gateway() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(
                    Arc::new(FailingClassifier),
                    Arc::new(ScriptedBackend::failing(&[])),
                )))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(json!({ "text": "I feel lost" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn generate_returns_image_and_records_history() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(healthy_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({ "text": "a majestic lion", "style": "Nature", "seed": 11 }))
            .to_request();
        let body: GenerateResponse = test::call_and_read_body_json(&app, req).await;

        assert!(body.image.starts_with("data:image/png;base64,"));
        assert_eq!(body.input_type, InputMode::Object);
        assert_eq!(body.style, StylePreset::Nature);
        assert_eq!(body.seed, 11);
        assert!(body.emotion_result.is_none());
        assert!(body.prompt_used.starts_with("a majestic lion"));

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({ "text": "I feel peaceful" }))
            .to_request();
        let body: GenerateResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.input_type, InputMode::Emotion);
        assert_eq!(body.style, StylePreset::Artistic);
        assert!(body.emotion_result.is_some());

        let req = test::TestRequest::get().uri("/api/history").to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history["count"], 2);
        assert_eq!(history["entries"][0]["original_text"], "I feel peaceful");
        assert!(history["entries"][0].get("image").is_none());
    }

    #[actix_web::test]
    async fn generate_rejects_bad_input() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(healthy_state()))
                .configure(configure),
        )
        .await;

        for payload in [
            json!({ "text": "" }),
            json!({ "text": "a lion", "style": "watercolor" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/generate")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn malformed_json_gets_structured_error() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(healthy_state()))
                .configure(configure),
        )
        .await;

        for uri in ["/api/analyze", "/api/generate"] {
            let req = test::TestRequest::post()
                .uri(uri)
                .insert_header(("content-type", "application/json"))
                .set_payload("{\"text\": ")
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Validation error");
            assert!(body["message"].as_str().unwrap().contains("Invalid JSON body"));
        }
    }

    #[actix_web::test]
    async fn generate_rejects_seed_above_max() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(healthy_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({ "text": "a lion", "seed": 3_000_000_000u32 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn generate_fails_when_both_tiers_fail() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(
                    Arc::new(FixedClassifier::dominant(EmotionLabel::Neutral)),
                    Arc::new(ScriptedBackend::failing(&["premium-model", "fast-model"])),
                )))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({ "text": "a lighthouse at dusk" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn health_reports_service_name() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(healthy_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["service"], "moodframe");
    }
}
