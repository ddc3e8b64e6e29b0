//! Configuration loading.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. explicit path (`--config <path>`)
//! 2. `~/.snaptask/config.toml` (user)
//! 3. built-in defaults
//!
//! Environment variables are layered on top with [`Config::apply_env`].
//! A missing API token is a valid state: image requests then report a
//! precondition failure instead of the process refusing to start.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::RetryConfig;
use crate::types::InferenceMode;
use crate::{Result, SuggestError};

/// Default chat-completions endpoint (Hugging Face router).
pub const DEFAULT_ENDPOINT_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// Token variables, first non-empty wins.
const TOKEN_ENV_VARS: &[&str] = &[
    "EXPO_PUBLIC_HUGGINGFACE_API_TOKEN",
    "EXPO_PUBLIC_HF_TOKEN",
    "HUGGINGFACE_API_TOKEN",
    "HF_TOKEN",
];

/// Endpoint override variables, first non-empty wins. Values may be a full
/// chat-completions URL or a provider base URL; see [`chat_completions_url`].
const ENDPOINT_ENV_VARS: &[&str] = &[
    "HF_INFERENCE_ENDPOINT_URL",
    "HUGGINGFACE_INFERENCE_ENDPOINT_URL",
    "HF_INFERENCE_BASE_URL",
    "HUGGINGFACE_INFERENCE_BASE_URL",
];

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

const RELAY_URL_ENV_VAR: &str = "EXPO_PUBLIC_AI_PROXY_URL";
const RELAY_PORT_ENV_VAR: &str = "AI_PROXY_PORT";
const VISION_MODEL_ENV_VAR: &str = "HF_VISION_MODEL";
const VISION_PROVIDER_ENV_VAR: &str = "HF_VISION_PROVIDER";
const CONTEXT_ENV_VAR: &str = "SNAPTASK_CONTEXT";

/// Where the engine runs, which decides the backend route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    /// Native runtime: call the provider directly.
    #[default]
    Native,
    /// Browser-hosted: cross-origin calls are blocked, go through the relay.
    Browser,
}

impl ExecutionContext {
    /// Parse a context name (`native`, `browser`/`web`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "native" | "ios" | "android" => Some(ExecutionContext::Native),
            "browser" | "web" => Some(ExecutionContext::Browser),
            _ => None,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub context: ExecutionContext,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Upstream provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Chat-completions endpoint.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Bearer token. Usually supplied through the environment.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-call timeout in seconds. Unset means the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            token: None,
            timeout_secs: None,
        }
    }
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

/// Local relay settings, used by browser clients and by the relay server.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Base URL clients use to reach the relay (e.g. `http://localhost:8787`).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Address the relay server binds to (default: 127.0.0.1:8787).
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Caption requests with fewer decoded image bytes are answered with `[]`.
    #[serde(default = "default_min_caption_bytes")]
    pub min_caption_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bind: default_bind(),
            min_caption_bytes: default_min_caption_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_min_caption_bytes() -> usize {
    750
}

/// Model identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Vision chat model used on the direct route and by the relay upstream.
    #[serde(default = "default_vision_model")]
    pub vision: String,
    /// Inference provider suffix appended as `model:provider`.
    #[serde(default = "default_vision_provider")]
    pub vision_provider: String,
    /// Model name the relay client reports for OCR.
    #[serde(default = "default_ocr_model")]
    pub ocr: String,
    /// Model name the relay client reports for captioning.
    #[serde(default = "default_caption_model")]
    pub caption: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            vision: default_vision_model(),
            vision_provider: default_vision_provider(),
            ocr: default_ocr_model(),
            caption: default_caption_model(),
        }
    }
}

impl ModelsConfig {
    /// The identifier sent upstream: `vision:provider`, or bare `vision`.
    pub fn vision_model_id(&self) -> String {
        let model = self.vision.trim();
        let provider = self.vision_provider.trim();
        if provider.is_empty() || model.contains(':') {
            model.to_string()
        } else {
            format!("{model}:{provider}")
        }
    }

    /// Model name reported to the relay for `mode`.
    pub fn relay_model(&self, mode: InferenceMode) -> &str {
        match mode {
            InferenceMode::Ocr => &self.ocr,
            InferenceMode::Caption => &self.caption,
        }
    }
}

fn default_vision_model() -> String {
    "allenai/Molmo2-8B".to_string()
}

fn default_vision_provider() -> String {
    "publicai".to_string()
}

fn default_ocr_model() -> String {
    "microsoft/trocr-base-printed".to_string()
}

fn default_caption_model() -> String {
    "Salesforce/blip-image-captioning-base".to_string()
}

/// Retry pacing for models that answer 503 while warming up.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Lower bound on a single backoff (default: 750ms).
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// Upper bound on a single backoff (default: 5000ms).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Warm-up estimate used when the provider reports none (default: 1200ms).
    #[serde(default = "default_estimate_ms")]
    pub default_estimate_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            default_estimate_ms: default_estimate_ms(),
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.max_attempts)
            .min_delay(Duration::from_millis(self.min_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .default_estimate(Duration::from_millis(self.default_estimate_ms))
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_min_delay_ms() -> u64 {
    750
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_estimate_ms() -> u64 {
    1200
}

impl Config {
    /// Load configuration and overlay the process environment.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.snaptask/config.toml`
    /// 3. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        Ok(config.apply_env())
    }

    /// Defaults plus the process environment.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Parse a TOML document.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map(Self::normalize)
            .map_err(|e| SuggestError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SuggestError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str::<Self>(&content)
            .map(Self::normalize)
            .map_err(|e| {
                SuggestError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
            })
    }

    /// Resolve the config file path. `None` means run on defaults.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SuggestError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".snaptask").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        Ok(None)
    }

    /// Overlay the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay variables from `lookup`. Empty values are ignored.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = first_non_empty(&lookup, TOKEN_ENV_VARS) {
            self.inference.token = Some(token);
        }
        if let Some(url) = first_non_empty(&lookup, ENDPOINT_ENV_VARS) {
            self.inference.endpoint_url = chat_completions_url(&url);
        }
        if let Some(url) = first_non_empty(&lookup, &[RELAY_URL_ENV_VAR]) {
            self.relay.base_url = Some(url);
        }
        if let Some(port) = first_non_empty(&lookup, &[RELAY_PORT_ENV_VAR])
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.relay.bind = format!("127.0.0.1:{port}");
        }
        if let Some(model) = first_non_empty(&lookup, &[VISION_MODEL_ENV_VAR]) {
            self.models.vision = model;
        }
        if let Some(provider) = first_non_empty(&lookup, &[VISION_PROVIDER_ENV_VAR]) {
            self.models.vision_provider = provider;
        }
        if let Some(context) = first_non_empty(&lookup, &[CONTEXT_ENV_VAR])
            .and_then(|c| ExecutionContext::parse(&c))
        {
            self.context = context;
        }
        self.normalize()
    }

    /// Trim settings and strip trailing slashes from URLs.
    fn normalize(mut self) -> Self {
        self.inference.endpoint_url = self
            .inference
            .endpoint_url
            .trim()
            .trim_end_matches('/')
            .to_string();
        self.inference.token = self
            .inference
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.relay.base_url = self
            .relay
            .base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        self
    }

    /// Whether an API token is configured.
    pub fn has_credential(&self) -> bool {
        self.inference
            .token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Resolve an endpoint override to a chat-completions URL.
///
/// A URL already ending in `/chat/completions` is kept; one ending in `/v1`
/// gets `/chat/completions`; any other base gets `/v1/chat/completions`.
pub fn chat_completions_url(url: &str) -> String {
    let base = url.trim().trim_end_matches('/');
    if base.ends_with(CHAT_COMPLETIONS_PATH) {
        base.to_string()
    } else if base.ends_with("/v1") {
        format!("{base}{CHAT_COMPLETIONS_PATH}")
    } else {
        format!("{base}/v1{CHAT_COMPLETIONS_PATH}")
    }
}

fn first_non_empty<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::default().apply_env_with(env(&[]));
        assert_eq!(config.context, ExecutionContext::Native);
        assert_eq!(config.inference.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert!(!config.has_credential());
        assert_eq!(config.relay.bind, "127.0.0.1:8787");
        assert_eq!(config.relay.min_caption_bytes, 750);
        assert_eq!(config.models.vision_model_id(), "allenai/Molmo2-8B:publicai");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn first_non_empty_token_wins() {
        let config = Config::default().apply_env_with(env(&[
            ("EXPO_PUBLIC_HUGGINGFACE_API_TOKEN", "   "),
            ("EXPO_PUBLIC_HF_TOKEN", " hf_second "),
            ("HF_TOKEN", "hf_last"),
        ]));
        assert_eq!(config.inference.token.as_deref(), Some("hf_second"));
        assert!(config.has_credential());
    }

    #[test]
    fn relay_and_endpoint_urls_lose_trailing_slashes() {
        let config = Config::default().apply_env_with(env(&[
            ("EXPO_PUBLIC_AI_PROXY_URL", "http://localhost:8787/"),
            ("HF_INFERENCE_ENDPOINT_URL", "http://example.test/v1/chat/completions//"),
            ("AI_PROXY_PORT", "9000"),
            ("SNAPTASK_CONTEXT", "web"),
        ]));
        assert_eq!(config.relay.base_url.as_deref(), Some("http://localhost:8787"));
        assert_eq!(
            config.inference.endpoint_url,
            "http://example.test/v1/chat/completions"
        );
        assert_eq!(config.relay.bind, "127.0.0.1:9000");
        assert_eq!(config.context, ExecutionContext::Browser);
    }

    #[test]
    fn endpoint_base_urls_gain_chat_path() {
        let config = Config::default().apply_env_with(env(&[(
            "HF_INFERENCE_BASE_URL",
            "http://localhost:8080/",
        )]));
        assert_eq!(
            config.inference.endpoint_url,
            "http://localhost:8080/v1/chat/completions"
        );

        let config = Config::default().apply_env_with(env(&[
            ("HUGGINGFACE_INFERENCE_ENDPOINT_URL", "http://tgi.local/v1"),
            ("HF_INFERENCE_BASE_URL", "http://ignored"),
        ]));
        assert_eq!(config.inference.endpoint_url, "http://tgi.local/v1/chat/completions");

        // Per-model task bases configure a different API and are not read.
        let config = Config::default().apply_env_with(env(&[(
            "EXPO_PUBLIC_HF_INFERENCE_BASE_URL",
            "https://router.huggingface.co/hf-inference/models/",
        )]));
        assert_eq!(config.inference.endpoint_url, DEFAULT_ENDPOINT_URL);
    }

    #[test]
    fn parse_toml_sections() {
        let config = Config::parse(
            r#"
            context = "browser"

            [relay]
            base_url = "http://localhost:8787"

            [models]
            vision = "org/model"
            vision_provider = ""

            [retry]
            max_attempts = 5
            min_delay_ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.context, ExecutionContext::Browser);
        assert_eq!(config.models.vision_model_id(), "org/model");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.min_delay_ms, 10);
        assert_eq!(config.retry.max_delay_ms, 5000);
    }

    #[test]
    fn invalid_toml_is_a_configuration_error() {
        let err = Config::parse("context = [").unwrap_err();
        assert!(matches!(err, SuggestError::Configuration(_)));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/snaptask.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn context_parse() {
        assert_eq!(ExecutionContext::parse("Browser"), Some(ExecutionContext::Browser));
        assert_eq!(ExecutionContext::parse("android"), Some(ExecutionContext::Native));
        assert_eq!(ExecutionContext::parse("toaster"), None);
    }
}
