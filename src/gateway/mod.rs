//! Inference gateway.
//!
//! [`InferenceGateway`] wraps whichever [`InferenceTransport`] is active with
//! the retry policy, per-attempt bookkeeping, diagnostics, and metrics. It
//! turns every upstream outcome into one of three shapes:
//!
//! - `Ok(Some(body))`: a 2xx JSON body
//! - `Ok(None)`: a terminal upstream failure, already described in the
//!   request's [`Diagnostics`]
//! - `Err(_)`: a network-level failure, also described, which aborts the
//!   request

mod retry;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{instrument, warn};

pub use retry::RetryConfig;
use retry::{RetryEvent, with_retry};

use crate::config::ExecutionContext;
use crate::diagnostics::{Diagnostics, truncate_body};
use crate::telemetry;
use crate::transport::InferenceTransport;
use crate::types::{AttemptResult, InferenceAttempt, InferenceMode, Route};
use crate::{Result, SuggestError};

/// Diagnostic written when the direct route has no bearer token.
pub const MISSING_TOKEN_MESSAGE: &str = "Missing Hugging Face token. \
Set EXPO_PUBLIC_HUGGINGFACE_API_TOKEN (or HF_TOKEN) and restart.";

/// Diagnostic written when a browser context has no relay configured.
pub const MISSING_RELAY_MESSAGE: &str = "Web requires a local AI proxy to avoid browser CORS \
blocking Hugging Face. Set EXPO_PUBLIC_AI_PROXY_URL (example: http://localhost:8787) \
and run snaptask-relay.";

const CORS_HINT: &str = "If you're running in the browser, Hugging Face calls may be blocked \
by CORS. Run snaptask-relay and set EXPO_PUBLIC_AI_PROXY_URL, or use a native build.";

/// Issues OCR and caption calls through a transport.
#[derive(Clone)]
pub struct InferenceGateway {
    transport: Arc<dyn InferenceTransport>,
    retry: RetryConfig,
    context: ExecutionContext,
}

impl InferenceGateway {
    pub fn new(
        transport: Arc<dyn InferenceTransport>,
        retry: RetryConfig,
        context: ExecutionContext,
    ) -> Self {
        Self {
            transport,
            retry,
            context,
        }
    }

    pub fn transport(&self) -> &Arc<dyn InferenceTransport> {
        &self.transport
    }

    pub fn route(&self) -> Route {
        self.transport.route()
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Check transport preconditions without any I/O.
    pub fn check_ready(&self) -> Result<()> {
        self.transport.check_ready()
    }

    /// Run [`check_ready`](Self::check_ready), describing any failure in
    /// `diag`. Returns whether calls may proceed.
    pub fn preflight(&self, diag: &mut Diagnostics) -> bool {
        match self.check_ready() {
            Ok(()) => true,
            Err(SuggestError::MissingCredential) => {
                diag.set(MISSING_TOKEN_MESSAGE);
                false
            }
            Err(SuggestError::MissingRelayUrl) => {
                diag.set(MISSING_RELAY_MESSAGE);
                false
            }
            Err(e) => {
                diag.set(e.to_string());
                false
            }
        }
    }

    pub async fn call_ocr(&self, image_base64: &str, diag: &mut Diagnostics) -> Result<Option<Value>> {
        self.call(InferenceMode::Ocr, image_base64, diag).await
    }

    pub async fn call_caption(
        &self,
        image_base64: &str,
        diag: &mut Diagnostics,
    ) -> Result<Option<Value>> {
        self.call(InferenceMode::Caption, image_base64, diag).await
    }

    /// Issue one logical call for `mode`, retrying while the model loads.
    #[instrument(skip(self, image_base64, diag), fields(mode = %mode, route = %self.route()))]
    pub async fn call(
        &self,
        mode: InferenceMode,
        image_base64: &str,
        diag: &mut Diagnostics,
    ) -> Result<Option<Value>> {
        let route = self.route();
        let label = self.label(mode);
        let model = self.transport.model_for(mode).to_string();
        let start = Instant::now();

        let result = with_retry(
            &self.retry,
            || self.transport.send(mode, image_base64),
            |event| match event {
                RetryEvent::Attempt { attempt, result } => {
                    diag.record_attempt(InferenceAttempt {
                        mode,
                        route,
                        model: model.clone(),
                        attempt,
                        result: AttemptResult::from_result(result),
                    });
                }
                RetryEvent::Backoff {
                    attempt,
                    max_attempts,
                    delay,
                    error,
                } => {
                    metrics::counter!(telemetry::RETRIES_TOTAL,
                        "mode" => mode.as_str(),
                        "route" => route.as_str(),
                    )
                    .increment(1);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "model loading, retrying"
                    );
                    diag.set(format!(
                        "{label} is loading (503). Retrying in {}ms...",
                        delay.as_millis()
                    ));
                }
            },
        )
        .await;

        record_request(mode, route, start, result.is_ok());

        match result {
            Ok(body) => Ok(Some(body)),
            Err(SuggestError::Http(message)) => {
                let mut text = format!("{label} network error: {message}");
                if self.context == ExecutionContext::Browser {
                    text.push_str(". ");
                    text.push_str(CORS_HINT);
                }
                diag.set(text);
                Err(SuggestError::Http(message))
            }
            Err(SuggestError::MalformedResponse { status, body }) => {
                warn!(status, "upstream returned a non-JSON body");
                diag.set(format!(
                    "{label} returned a malformed response (HTTP {status}): {}",
                    truncate_body(&body)
                ));
                Ok(None)
            }
            Err(e) => match e.status() {
                Some(status) => {
                    warn!(status, error = %e, "upstream call failed");
                    diag.set(format!(
                        "{label} HTTP {status}: {}",
                        truncate_body(e.body().unwrap_or_default())
                    ));
                    Ok(None)
                }
                None => Err(e),
            },
        }
    }

    /// Human-readable name of a call, as used in diagnostics.
    pub fn label(&self, mode: InferenceMode) -> String {
        match self.route() {
            Route::Direct => format!("{} (vision chat)", mode.label()),
            Route::Relay => format!("{} proxy", mode.label()),
        }
    }
}

fn record_request(mode: InferenceMode, route: Route, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "mode" => mode.as_str(),
        "route" => route.as_str(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "mode" => mode.as_str(),
        "route" => route.as_str(),
    )
    .record(start.elapsed().as_secs_f64());
}
