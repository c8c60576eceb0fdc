//! Serve command - HTTP extraction service.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use invex_core::error::ExtractionError;
use invex_core::models::config::InvexConfig;
use invex_core::{
    ExtractionResult, InvoiceAssembler, InvoiceExtractor, OcrBackend, PureOcrEngine,
    SourceKind,
};

use super::{load_config, load_ocr_engine};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (default from config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (default: $PORT, then config)
    #[arg(short, long)]
    port: Option<u16>,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Install the service's log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,invex=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .with_context(|| format!("Invalid PORT: {}", port))?;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let model_dir = args
        .model_dir
        .unwrap_or_else(|| config.models.model_dir.clone());
    let state = AppState::new(config, &model_dir);

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(address = %listener.local_addr()?, "Invoice extraction service listening");

    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Shared request context. The OCR engine is loaded once and used behind a mutex.
#[derive(Clone)]
pub struct AppState {
    config: Arc<InvexConfig>,
    ocr: Option<Arc<Mutex<PureOcrEngine>>>,
}

impl AppState {
    /// Without usable models in `model_dir` the service still starts and
    /// image uploads report no data.
    pub fn new(config: InvexConfig, model_dir: &Path) -> Self {
        let ocr = match load_ocr_engine(Some(model_dir), &config) {
            Ok(engine) => Some(Arc::new(Mutex::new(engine))),
            Err(e) => {
                warn!("{:#}\nImage uploads will fail", e);
                None
            }
        };

        Self {
            config: Arc::new(config),
            ocr,
        }
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/health", get(health_handler))
        .route("/extract", post(extract_handler))
        .route("/extract-text", post(extract_text_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Base64-encoded file upload.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub filename: String,
    pub mime_type: String,
    pub data: String,
}

#[derive(Deserialize)]
pub struct TextExtractRequest {
    pub text: String,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Response envelope shared by both extraction routes.
#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    fn success(data: ExtractionResult) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

fn respond(result: Result<ExtractionResult, ExtractionError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(e @ ExtractionError::UnsupportedMimeType(_)) => {
            warn!(error = %e, "Rejected upload");
            (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(e.to_string()))).into_response()
        }
        Err(e) => (StatusCode::OK, Json(ApiResponse::failure(e.to_string()))).into_response(),
    }
}

pub async fn extract_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Response {
    debug!(
        filename = %request.filename,
        mime_type = %request.mime_type,
        "Processing upload"
    );

    let data = match BASE64.decode(request.data.trim()) {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "Invalid base64 payload");
            return (StatusCode::OK, Json(ApiResponse::failure(e.to_string()))).into_response();
        }
    };

    let task = tokio::task::spawn_blocking(move || {
        extract_upload(&state, &request.filename, &request.mime_type, &data)
    });

    match task.await {
        Ok(result) => respond(result),
        Err(e) => {
            error!(error = %e, "Extraction task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure(e.to_string())),
            )
                .into_response()
        }
    }
}

fn extract_upload(
    state: &AppState,
    filename: &str,
    mime_type: &str,
    data: &[u8],
) -> Result<ExtractionResult, ExtractionError> {
    let engine = state
        .ocr
        .as_deref()
        .filter(|_| SourceKind::from_mime(mime_type) == Some(SourceKind::Image));

    let guard = match engine.map(Mutex::lock) {
        Some(Ok(guard)) => Some(guard),
        Some(Err(poisoned)) => {
            warn!("OCR engine lock was poisoned, reusing it");
            Some(poisoned.into_inner())
        }
        None => None,
    };

    InvoiceAssembler::from_config(&state.config.extraction).extract_from_upload(
        filename,
        mime_type,
        data,
        &state.config.pdf,
        guard.as_deref().map(|engine| engine as &dyn OcrBackend),
    )
}

pub async fn extract_text_handler(
    State(state): State<AppState>,
    Json(request): Json<TextExtractRequest>,
) -> Response {
    let subject = request.subject.unwrap_or_default();
    debug!(subject = %subject, "Processing email text");

    respond(
        InvoiceAssembler::from_config(&state.config.extraction)
            .extract_from_email(&request.text, &subject),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(InvexConfig::default(), Path::new("/nonexistent/models"))
    }

    fn app() -> Router {
        create_router(state())
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn extract_text_uses_subject() {
        let (status, body) = post_json(
            "/extract-text",
            json!({"text": "Order total: $23.10", "subject": "Receipt from Whole Foods"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["merchant"], "Whole Foods");
        assert_eq!(body["data"]["amount"], 23.1);
        assert_eq!(body["data"]["extractionMethod"], "email_body");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn extract_text_without_subject() {
        let (status, body) = post_json("/extract-text", json!({"text": ""})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["merchant"], "Unknown Merchant");
    }

    #[tokio::test]
    async fn unsupported_mime_type_is_bad_request() {
        let (status, body) = post_json(
            "/extract",
            json!({"filename": "notes.txt", "mimeType": "text/plain", "data": BASE64.encode("hi")}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "error": "Unsupported file type: text/plain"})
        );
    }

    #[tokio::test]
    async fn invalid_base64_is_reported() {
        let (status, body) = post_json(
            "/extract",
            json!({"filename": "a.pdf", "mimeType": "application/pdf", "data": "***"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unreadable_pdf_is_no_data() {
        let (status, body) = post_json(
            "/extract",
            json!({
                "filename": "a.pdf",
                "mimeType": "application/pdf",
                "data": BASE64.encode("not really a pdf"),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "error": "Failed to extract data"}));
    }

    #[test]
    fn missing_models_leave_state_without_engine() {
        assert!(!state().has_ocr());
    }

    #[tokio::test]
    async fn image_without_models_is_no_data() {
        let (status, body) = post_json(
            "/extract",
            json!({
                "filename": "r.png",
                "mimeType": "image/png",
                "data": BASE64.encode([0x89, b'P', b'N', b'G']),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "error": "Failed to extract data"}));
    }
}
