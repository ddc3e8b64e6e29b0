//! Transport through the same-origin local relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{InferenceTransport, read_response};
use crate::config::Config;
use crate::types::{InferenceMode, Route};
use crate::{Result, SuggestError};

/// Posts images to `{base_url}/ocr` or `{base_url}/caption`.
///
/// The relay holds the credential; this side only needs its URL.
#[derive(Clone)]
pub struct RelayedTransport {
    http: Client,
    base_url: Option<String>,
    ocr_model: String,
    caption_model: String,
}

impl RelayedTransport {
    pub fn new(
        http: Client,
        base_url: Option<String>,
        ocr_model: impl Into<String>,
        caption_model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            ocr_model: ocr_model.into(),
            caption_model: caption_model.into(),
        }
    }

    pub fn from_config(config: &Config, http: Client) -> Self {
        Self::new(
            http,
            config.relay.base_url.clone(),
            config.models.relay_model(InferenceMode::Ocr),
            config.models.relay_model(InferenceMode::Caption),
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    model: &'a str,
    image_base64: &'a str,
}

#[async_trait]
impl InferenceTransport for RelayedTransport {
    fn name(&self) -> &str {
        "relay"
    }

    fn route(&self) -> Route {
        Route::Relay
    }

    fn model_for(&self, mode: InferenceMode) -> &str {
        match mode {
            InferenceMode::Ocr => &self.ocr_model,
            InferenceMode::Caption => &self.caption_model,
        }
    }

    fn check_ready(&self) -> Result<()> {
        match self.base_url {
            Some(_) => Ok(()),
            None => Err(SuggestError::MissingRelayUrl),
        }
    }

    async fn send(&self, mode: InferenceMode, image_base64: &str) -> Result<Value> {
        let base_url = self.base_url.as_deref().ok_or(SuggestError::MissingRelayUrl)?;
        let url = format!("{}{}", base_url, mode.relay_path());
        let model = self.model_for(mode);

        debug!(mode = mode.as_str(), %url, model, "posting to relay");
        let response = self
            .http
            .post(&url)
            .json(&RelayRequest {
                model,
                image_base64,
            })
            .send()
            .await
            .map_err(|e| SuggestError::Http(e.to_string()))?;

        read_response(response).await
    }
}
