//! Backend transports for inference calls.
//!
//! A transport knows how to deliver one `(mode, image)` request upstream and
//! how to classify the HTTP answer. Two implementations exist:
//! - [`DirectTransport`] posts a chat-completion body straight to the
//!   provider with a bearer token;
//! - [`RelayedTransport`] posts `{model, imageBase64}` to a same-origin
//!   local relay, for browser contexts where cross-origin calls are blocked.
//!
//! The gateway is unaware of which one is active.
//!
//! # Error contract
//!
//! `send` returns the decoded JSON body on 2xx. Otherwise:
//! - 503 → [`SuggestError::ModelLoading`] (retryable), carrying the
//!   provider's `estimated_time` when present
//! - any other non-2xx → [`SuggestError::Api`] with the raw body
//! - 2xx with a non-JSON body → [`SuggestError::MalformedResponse`]
//! - connection failures → [`SuggestError::Http`]

mod direct;
mod relayed;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::{Config, ExecutionContext};
use crate::types::{InferenceMode, Route};
use crate::{Result, SuggestError};

pub use direct::DirectTransport;
pub use relayed::RelayedTransport;

/// Delivers inference requests to an upstream.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    /// Transport name for logging/debugging.
    fn name(&self) -> &str;

    /// Which route this transport takes.
    fn route(&self) -> Route;

    /// Model identifier sent for `mode`.
    fn model_for(&self, mode: InferenceMode) -> &str;

    /// Check preconditions (credential, relay URL) without any I/O.
    fn check_ready(&self) -> Result<()>;

    /// Send one request. See the module docs for the error contract.
    async fn send(&self, mode: InferenceMode, image_base64: &str) -> Result<Value>;
}

/// Pick the transport for the configured execution context.
pub fn for_config(config: &Config, http: Client) -> Arc<dyn InferenceTransport> {
    match config.context {
        ExecutionContext::Native => Arc::new(DirectTransport::from_config(config, http)),
        ExecutionContext::Browser => Arc::new(RelayedTransport::from_config(config, http)),
    }
}

/// Build the shared HTTP client.
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| SuggestError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Classify a response per the module error contract.
pub(crate) async fn read_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| SuggestError::Http(e.to_string()))?;

    match status {
        200..=299 => {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text)
                .map_err(|_| SuggestError::MalformedResponse { status, body: text })
        }
        503 => Err(SuggestError::ModelLoading {
            estimated_time: estimated_time(&text),
            body: text,
        }),
        _ => Err(SuggestError::Api { status, body: text }),
    }
}

/// Parse `estimated_time` (seconds) from a 503 body.
///
/// Zero, negative, non-finite and out-of-range values count as absent.
pub(crate) fn estimated_time(body: &str) -> Option<Duration> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("estimated_time")
        .and_then(Value::as_f64)
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
