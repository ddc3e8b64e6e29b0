//! Local relay server.
//!
//! Browsers cannot call the inference provider directly (cross-origin
//! requests are blocked), so browser clients post images to this relay,
//! which holds the token and calls upstream server-side.
//!
//! # Endpoints
//!
//! | Method    | Path       | Description                                   |
//! |-----------|------------|-----------------------------------------------|
//! | `POST`    | `/ocr`     | Transcribe text; `{generated_text: "<text>"}` |
//! | `POST`    | `/caption` | Suggest tasks; `{generated_text: "[...]"}`    |
//! | `OPTIONS` | both       | Preflight, `204 No Content`                   |
//!
//! Request body: `{"model": "...", "imageBase64": "<base64 or data URL>"}`.
//! The relay always uses its own configured vision model.
//!
//! # Error contract
//!
//! ```json
//! { "error": "...", "details": "<upstream body>", "hint": "...", "estimated_time": 12.5 }
//! ```
//!
//! Upstream failures keep the upstream status, except a non-JSON 2xx body,
//! which answers `502`. Unknown routes and methods answer
//! `404 {"error": "Not found"}`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::extract::{extract_text, unwrap_ocr_payload};
use crate::image;
use crate::parse::caption;
use crate::transport::{self, DirectTransport, InferenceTransport};
use crate::types::InferenceMode;
use crate::{Result, SuggestError};

const INFERENCE_PROVIDERS_HINT: &str = "If you're seeing 404 from router.huggingface.co, \
your token likely lacks Inference Providers access. Create a fine-grained token with \
'Make calls to Inference Providers' permission and set HUGGINGFACE_API_TOKEN.";

/// Shared state for relay handlers.
#[derive(Clone)]
pub struct RelayState {
    upstream: Arc<dyn InferenceTransport>,
    min_caption_bytes: usize,
}

impl RelayState {
    pub fn new(upstream: Arc<dyn InferenceTransport>, min_caption_bytes: usize) -> Self {
        Self {
            upstream,
            min_caption_bytes,
        }
    }

    /// Direct upstream transport built from the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = transport::build_http_client(
            config
                .inference
                .timeout_secs
                .map(std::time::Duration::from_secs),
        )?;
        Ok(Self::new(
            Arc::new(DirectTransport::from_config(config, http)),
            config.relay.min_caption_bytes,
        ))
    }
}

/// Build the relay router.
pub fn router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/ocr",
            post(handle_ocr).options(preflight).fallback(not_found),
        )
        .route(
            "/caption",
            post(handle_caption).options(preflight).fallback(not_found),
        )
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Run the relay until the process is terminated.
pub async fn serve(config: &Config) -> Result<()> {
    let state = RelayState::from_config(config)?;
    let app = router(state);

    info!(bind = %config.relay.bind, "relay listening");
    info!(token_present = config.has_credential(), "relay credential");
    if config.inference.endpoint_url != crate::config::DEFAULT_ENDPOINT_URL {
        info!(endpoint = %config.inference.endpoint_url, "endpoint override");
    }
    info!(
        model = %config.models.vision,
        provider = %config.models.vision_provider,
        "vision model"
    );

    let listener = tokio::net::TcpListener::bind(&config.relay.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Request / response bodies ============

/// The `model` field clients send is accepted and ignored.
#[derive(Debug, Default, Deserialize)]
struct RelayRequest {
    #[serde(default, rename = "imageBase64")]
    image_base64: Option<String>,
}

impl RelayRequest {
    fn image(&self) -> Option<&str> {
        self.image_base64
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct GeneratedText {
    generated_text: String,
}

// ============ Error response ============

/// Relay error that converts into a JSON HTTP response.
#[derive(Debug, Serialize)]
struct RelayError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_time: Option<f64>,
}

impl RelayError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
            hint: None,
            estimated_time: None,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<SuggestError> for RelayError {
    fn from(err: SuggestError) -> Self {
        match err {
            SuggestError::MissingCredential => RelayError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Missing HUGGINGFACE_API_TOKEN",
            ),
            SuggestError::MissingImage => {
                RelayError::new(StatusCode::BAD_REQUEST, "Missing imageBase64")
            }
            SuggestError::MalformedResponse { body, .. } => {
                let mut relay = RelayError::new(
                    StatusCode::BAD_GATEWAY,
                    "Upstream returned a malformed response",
                );
                relay.details = Some(body.trim().to_string()).filter(|b| !b.is_empty());
                relay
            }
            err => {
                let status = err
                    .status()
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let mut relay = RelayError::new(status, err.to_string());
                relay.details = err
                    .body()
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .map(str::to_string);
                relay.estimated_time = err.estimated_time().map(|d| d.as_secs_f64());
                if status == StatusCode::NOT_FOUND {
                    relay.hint = Some(INFERENCE_PROVIDERS_HINT.to_string());
                }
                relay
            }
        }
    }
}

// ============ Handlers ============

async fn handle_ocr(
    State(state): State<RelayState>,
    body: Bytes,
) -> std::result::Result<Json<GeneratedText>, RelayError> {
    let request = parse_request(&body)?;
    let content = call_upstream(&state, InferenceMode::Ocr, &request).await?;
    Ok(Json(GeneratedText {
        generated_text: unwrap_ocr_payload(&content),
    }))
}

async fn handle_caption(
    State(state): State<RelayState>,
    body: Bytes,
) -> std::result::Result<Json<GeneratedText>, RelayError> {
    let request = parse_request(&body)?;

    // Tiny images produce hallucinated tasks.
    let size = request
        .image()
        .and_then(|b64| image::decode(b64).ok())
        .map_or(0, |bytes| bytes.len());
    if size < state.min_caption_bytes {
        info!(size, "caption image below size guard");
        return Ok(Json(GeneratedText {
            generated_text: "[]".to_string(),
        }));
    }

    let content = call_upstream(&state, InferenceMode::Caption, &request).await?;
    let suggestions = caption::from_json(&content).unwrap_or_default();
    let generated_text = serde_json::to_string(&suggestions).map_err(SuggestError::from)?;
    Ok(Json(GeneratedText { generated_text }))
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> RelayError {
    RelayError::new(StatusCode::NOT_FOUND, "Not found")
}

fn parse_request(body: &[u8]) -> std::result::Result<RelayRequest, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RelayRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| RelayError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Forward one request upstream and return the model's text reply.
async fn call_upstream(
    state: &RelayState,
    mode: InferenceMode,
    request: &RelayRequest,
) -> std::result::Result<String, RelayError> {
    state.upstream.check_ready()?;
    let image = request.image().ok_or(SuggestError::MissingImage)?;

    match state.upstream.send(mode, image).await {
        Ok(body) => Ok(extract_text(&body)),
        Err(e) => {
            warn!(mode = %mode, error = %e, "upstream call failed");
            Err(e.into())
        }
    }
}
