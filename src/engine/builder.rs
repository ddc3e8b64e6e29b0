//! Builder for configuring engine instances

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::SuggestionEngine;
use crate::Result;
use crate::config::{Config, ExecutionContext};
use crate::gateway::{InferenceGateway, RetryConfig};
use crate::image::ImageNormalizer;
use crate::transport::{self, InferenceTransport};

/// Builder for [`SuggestionEngine`].
///
/// Starts from built-in defaults (not the environment); use
/// [`from_config`](Self::from_config) with [`Config::from_env`] to honour
/// the usual variables.
pub struct EngineBuilder {
    config: Config,
    retry: Option<RetryConfig>,
    transport: Option<Arc<dyn InferenceTransport>>,
    http: Option<Client>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Start from an existing configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            retry: None,
            transport: None,
            http: None,
        }
    }

    /// Bearer token for the direct route.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.inference.token = Some(token.into());
        self
    }

    /// Chat-completions endpoint for the direct route.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.inference.endpoint_url = url.into();
        self
    }

    /// Local relay base URL for the browser route.
    pub fn relay_url(mut self, url: impl Into<String>) -> Self {
        self.config.relay.base_url = Some(url.into());
        self
    }

    /// Execution context, which selects the route.
    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.config.context = context;
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.models.vision = model.into();
        self
    }

    pub fn vision_provider(mut self, provider: impl Into<String>) -> Self {
        self.config.models.vision_provider = provider.into();
        self
    }

    /// Model named in relayed OCR requests.
    pub fn ocr_model(mut self, model: impl Into<String>) -> Self {
        self.config.models.ocr = model.into();
        self
    }

    /// Model named in relayed caption requests.
    pub fn caption_model(mut self, model: impl Into<String>) -> Self {
        self.config.models.caption = model.into();
        self
    }

    /// Per-call HTTP timeout. Unset means no timeout beyond the transport's.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.inference.timeout_secs = Some(secs);
        self
    }

    /// Override the retry pacing from the configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Use a custom transport instead of the one the context selects.
    pub fn transport(mut self, transport: Arc<dyn InferenceTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an existing HTTP client.
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the engine.
    pub fn build(self) -> Result<SuggestionEngine> {
        let http = match self.http {
            Some(http) => http,
            None => transport::build_http_client(
                self.config.inference.timeout_secs.map(Duration::from_secs),
            )?,
        };

        let transport = self
            .transport
            .unwrap_or_else(|| transport::for_config(&self.config, http.clone()));
        let retry = self
            .retry
            .unwrap_or_else(|| self.config.retry.to_retry_config());

        Ok(SuggestionEngine::from_parts(
            InferenceGateway::new(transport, retry, self.config.context),
            ImageNormalizer::new(http),
            self.config.has_credential(),
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
