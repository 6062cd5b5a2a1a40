use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::services::{enrich_answer, meal_form, normalize_files, qa_form, read_form, validate};
use crate::{
    error::ProxyError,
    state::AppState,
    upstream::classify,
};

pub fn analyzer_routes() -> Router<AppState> {
    Router::new()
        .route("/multimodal-analyzer", post(analyze_multimodal))
        .route("/analyze-meal", post(analyze_meal))
}

/// POST /multimodal-analyzer (multipart: `question` + `files`/`file`)
#[instrument(skip_all)]
pub async fn analyze_multimodal(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ProxyError> {
    let started = Instant::now();

    // This route never falls back to the default AI host.
    let base = state
        .config
        .ai_api_url
        .as_deref()
        .ok_or_else(ProxyError::missing_ai_url)?;

    let request = validate(read_form(multipart?).await?)?;
    let total_bytes: usize = request.files.iter().map(|f| f.data.len()).sum();
    info!(files = request.files.len(), total_bytes, "forwarding multimodal question");

    let req = state
        .upstream
        .http()
        .post(format!("{base}/qa"))
        .multipart(qa_form(&request));
    let raw = state
        .upstream
        .exchange(req, state.config.timeouts.media)
        .await
        .map_err(ProxyError::for_upload)?;
    let body = classify(&raw)?;
    let enriched = enrich_answer(body, raw.elapsed, started.elapsed())?;

    info!(
        processing_time_ms = enriched["metadata"]["processing_time_ms"].as_f64().unwrap_or_default(),
        "multimodal answer ready"
    );
    Ok(Json(enriched))
}

/// POST /analyze-meal (multipart: one image under `file`)
#[instrument(skip_all)]
pub async fn analyze_meal(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ProxyError> {
    let raw_form = read_form(multipart?).await?;
    let Some(image) = normalize_files(raw_form).into_iter().next() else {
        return Err(ProxyError::Input("An image file is required".into()));
    };
    info!(file = %image.file_name, bytes = image.data.len(), "analyzing meal image");

    let url = format!("{}/analyze-meal", state.config.ai_base());
    let req = state.upstream.http().post(url).multipart(meal_form(&image));
    let body = state
        .upstream
        .call_json(req, state.config.timeouts.media)
        .await
        .map_err(ProxyError::for_upload)?;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        extract::Multipart,
        http::{header, Request, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    use crate::{
        app::build_app,
        config::{AppConfig, Timeouts},
        state::AppState,
        test_support::{multipart_body, send, spawn_upstream},
    };

    const BOUNDARY: &str = "nutriproxy-test-boundary";

    fn form_request(
        uri: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &str, &[u8])],
    ) -> Request<Body> {
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(BOUNDARY, fields, files)))
            .unwrap()
    }

    fn ask(question: &str, files: &[(&str, &str, &str, &[u8])]) -> Request<Body> {
        form_request("/api/multimodal-analyzer", &[("question", question)], files)
    }

    /// Mock QA service echoing what it received.
    async fn echo_qa(req_timeout: Option<Duration>) -> AppState {
        let upstream = Router::new().route(
            "/qa",
            post(|mut mp: Multipart| async move {
                let mut question = String::new();
                let mut use_files_api = String::new();
                let mut names = Vec::new();
                while let Some(field) = mp.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    match name.as_str() {
                        "question" => question = field.text().await.unwrap(),
                        "use_files_api" => use_files_api = field.text().await.unwrap(),
                        "files" => names.push(field.file_name().unwrap_or_default().to_string()),
                        _ => {}
                    }
                }
                Json(json!({
                    "ok": true,
                    "answer": format!("{question} [{}] use_files_api={use_files_api}", names.join(",")),
                    "metadata": {"processing_time_ms": 12}
                }))
            }),
        );
        let base = spawn_upstream(upstream).await;
        let mut timeouts = Timeouts::default();
        if let Some(t) = req_timeout {
            timeouts.media = t;
        }
        AppState::fake_with(AppConfig {
            ai_api_url: Some(base),
            timeouts,
            ..AppConfig::default()
        })
    }

    async fn state_with_qa(handler: axum::routing::MethodRouter, media: Duration) -> AppState {
        let base = spawn_upstream(Router::new().route("/qa", handler)).await;
        AppState::fake_with(AppConfig {
            ai_api_url: Some(base),
            timeouts: Timeouts {
                media,
                ..Timeouts::default()
            },
            ..AppConfig::default()
        })
    }

    #[tokio::test]
    async fn multiple_files_are_forwarded_under_files() {
        let app = build_app(echo_qa(None).await);
        let (status, body) = send(
            app,
            ask(
                "what is this?",
                &[
                    ("files", "a.png", "image/png", b"a"),
                    ("files", "b.pdf", "application/pdf", b"b"),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["answer"], "what is this? [a.png,b.pdf] use_files_api=false");
        assert!(body["metadata"]["processing_time_ms"].as_f64().unwrap() >= 12.0);
        assert_eq!(body["metadata"]["upstream_processing_time_ms"], 12.0);
    }

    #[tokio::test]
    async fn legacy_file_field_is_accepted() {
        let app = build_app(echo_qa(None).await);
        let (status, body) = send(app, ask("resume", &[("file", "v.mp4", "video/mp4", b"vid")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "resume [v.mp4] use_files_api=false");
    }

    #[tokio::test]
    async fn empty_question_is_400() {
        let app = build_app(echo_qa(None).await);
        let (status, body) = send(app, ask("", &[("file", "a.png", "image/png", b"a")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_files_is_400() {
        let app = build_app(echo_qa(None).await);
        let (status, body) = send(app, ask("what is this?", &[])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn non_json_upstream_is_502_with_snippet() {
        let html = format!("<html><body>{}</body></html>", "oops ".repeat(600));
        let handler = post(move || {
            let html = html.clone();
            async move { ([(header::CONTENT_TYPE, "text/html")], html) }
        });
        let app = build_app(state_with_qa(handler, Duration::from_secs(5)).await);
        let (status, body) = send(app, ask("q", &[("file", "a.png", "image/png", b"a")])).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["ok"], false);
        let snippet = body["bodySnippet"].as_str().unwrap();
        assert!(snippet.starts_with("<html>"));
        assert!(snippet.chars().count() <= 1000);
        assert_eq!(body["contentType"], "text/html");
    }

    #[tokio::test]
    async fn slow_upstream_is_408() {
        let handler = post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"ok": true, "answer": "late"}))
        });
        let app = build_app(state_with_qa(handler, Duration::from_millis(200)).await);
        let (status, body) = send(app, ask("q", &[("file", "a.png", "image/png", b"a")])).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("timeout"));
        assert!(error.contains("reducing the file size"));
    }

    #[tokio::test]
    async fn answerless_reply_is_502_naming_the_missing_answer() {
        let handler = post(|| async { Json(json!({"ok": true})) });
        let app = build_app(state_with_qa(handler, Duration::from_secs(5)).await);
        let (status, body) = send(app, ask("q", &[("file", "a.png", "image/png", b"a")])).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Upstream response has no answer (status 200)");
        assert_eq!(body["bodySnippet"], r#"{"ok":true}"#);
        assert_eq!(body["contentType"], "application/json");
    }

    #[tokio::test]
    async fn upload_over_body_limit_is_413() {
        let state = echo_qa(None).await;
        let mut config = (*state.config).clone();
        config.max_upload_bytes = 1024;
        let app = build_app(AppState::from_parts(
            std::sync::Arc::new(config),
            state.upstream.clone(),
            state.metrics.clone(),
        ));
        let big = vec![b'x'; 4096];
        let (status, body) = send(app, ask("q", &[("files", "big.png", "image/png", big.as_slice())])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("size limit"));
    }

    #[tokio::test]
    async fn upstream_error_status_is_propagated() {
        let handler = post(|| async {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": "unsupported file"})))
        });
        let app = build_app(state_with_qa(handler, Duration::from_secs(5)).await);
        let (status, body) = send(app, ask("q", &[("file", "a.xyz", "x/y", b"a")])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"]["detail"], "unsupported file");
    }

    #[tokio::test]
    async fn soft_failure_is_400() {
        let handler = post(|| async { Json(json!({"ok": false, "error": "could not read video"})) });
        let app = build_app(state_with_qa(handler, Duration::from_secs(5)).await);
        let (status, body) = send(app, ask("q", &[("file", "v.mp4", "video/mp4", b"v")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "could not read video");
    }

    #[tokio::test]
    async fn missing_ai_url_is_config_error() {
        let app = build_app(AppState::fake());
        let (status, body) = send(app, ask("q", &[("file", "a.png", "image/png", b"a")])).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert!(body["hint"].as_str().unwrap().contains("AI_API_URL"));
    }

    #[tokio::test]
    async fn non_multipart_body_is_400() {
        let app = build_app(echo_qa(None).await);
        let req = Request::post("/api/multimodal-analyzer")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn meal_image_is_forwarded_as_file() {
        let upstream = Router::new().route(
            "/analyze-meal",
            post(|mut mp: Multipart| async move {
                let field = mp.next_field().await.unwrap().unwrap();
                let name = field.name().unwrap_or_default().to_string();
                Json(json!({
                    "ok": name == "file",
                    "nutrients": {"calories": 540, "protein_g": 30, "carbs_g": 60, "fat_g": 18},
                    "metadata": {"method": "vision", "model": "m", "processing_time_ms": 900}
                }))
            }),
        );
        let base = spawn_upstream(upstream).await;
        let app = build_app(AppState::fake_with(AppConfig {
            ai_api_url: Some(base),
            ..AppConfig::default()
        }));
        let req = form_request("/api/analyze-meal", &[], &[("file", "plate.jpg", "image/jpeg", b"jpg")]);
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["nutrients"]["calories"], 540);
    }

    #[tokio::test]
    async fn meal_without_image_is_400() {
        let app = build_app(AppState::fake());
        let req = form_request("/api/analyze-meal", &[("note", "x")], &[]);
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
