//! Direct-to-provider transport.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{InferenceTransport, read_response};
use crate::config::{Config, DEFAULT_ENDPOINT_URL};
use crate::image::to_data_url;
use crate::types::{ChatCompletionRequest, InferenceMode, Route};
use crate::{Result, SuggestError};

/// Calls a chat-completions endpoint with a vision model and bearer token.
///
/// OCR and captioning share the model; the prompt selects the behavior.
#[derive(Clone)]
pub struct DirectTransport {
    http: Client,
    endpoint: String,
    token: Option<String>,
    model: String,
}

impl DirectTransport {
    /// Create a transport for the default endpoint.
    pub fn new(http: Client, token: Option<String>, model: impl Into<String>) -> Self {
        Self::with_endpoint(http, DEFAULT_ENDPOINT_URL, token, model)
    }

    /// Create a transport with a custom endpoint (for testing with wiremock).
    pub fn with_endpoint(
        http: Client,
        endpoint: impl Into<String>,
        token: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config, http: Client) -> Self {
        Self::with_endpoint(
            http,
            config.inference.endpoint_url.clone(),
            config.inference.token.clone(),
            config.models.vision_model_id(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceTransport for DirectTransport {
    fn name(&self) -> &str {
        "direct"
    }

    fn route(&self) -> Route {
        Route::Direct
    }

    fn model_for(&self, _mode: InferenceMode) -> &str {
        &self.model
    }

    fn check_ready(&self) -> Result<()> {
        match self.token {
            Some(_) => Ok(()),
            None => Err(SuggestError::MissingCredential),
        }
    }

    async fn send(&self, mode: InferenceMode, image_base64: &str) -> Result<Value> {
        let token = self.token.as_deref().ok_or(SuggestError::MissingCredential)?;
        let body = ChatCompletionRequest::vision(&self.model, mode.prompt(), to_data_url(image_base64));

        debug!(mode = mode.as_str(), model = %self.model, "posting vision chat completion");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SuggestError::Http(e.to_string()))?;

        read_response(response).await
    }
}
