//! Suggestion engine: the top-level pipeline.
//!
//! ```text
//! image ─▶ normalize ─▶ OCR call ─▶ extract ─▶ parse ──▶ suggestions
//!                          │                     │ (none)
//!                          └────────▶ caption call ─▶ extract ─▶ parse
//! ```
//!
//! [`SuggestionEngine::suggest_from_image`] never fails: every error ends up
//! as an empty list plus a diagnostic in the returned [`SuggestionOutcome`].

mod builder;

pub use builder::EngineBuilder;

use std::sync::Mutex;

use tracing::{info, instrument, warn};

use crate::{Result, SuggestError};
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::extract::{extract_text, unwrap_ocr_payload};
use crate::gateway::InferenceGateway;
use crate::image::ImageNormalizer;
use crate::parse::{self, MAX_SUGGESTIONS, clean_ocr_text, parse_caption_text, parse_ocr_text};
use crate::telemetry;
use crate::types::{InferenceMode, Route, Suggestion, SuggestionOutcome};

pub const MISSING_IMAGE_MESSAGE: &str = "Missing image reference.";
pub const OCR_EMPTY_MESSAGE: &str = "OCR returned empty content.";
pub const OCR_UNUSABLE_MESSAGE: &str =
    "OCR extracted text, but it looked like a watermark or not a task.";
pub const CAPTION_EMPTY_MESSAGE: &str = "Caption model returned empty content.";
pub const NOTHING_FOUND_MESSAGE: &str = "No OCR text and no visual suggestions returned.";

/// Turns images and text into task suggestions.
///
/// Requests are independent: each owns its diagnostics, so one engine can
/// serve concurrent calls.
pub struct SuggestionEngine {
    gateway: InferenceGateway,
    normalizer: ImageNormalizer,
    token_present: bool,
    last_diagnostic: Mutex<Option<String>>,
}

impl SuggestionEngine {
    /// Create a new builder for configuring the engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Build an engine from a loaded configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        EngineBuilder::from_config(config).build()
    }

    pub(crate) fn from_parts(
        gateway: InferenceGateway,
        normalizer: ImageNormalizer,
        token_present: bool,
    ) -> Self {
        info!(
            route = %gateway.route(),
            transport = gateway.transport().name(),
            token_present,
            "suggestion engine ready"
        );
        Self {
            gateway,
            normalizer,
            token_present,
            last_diagnostic: Mutex::new(None),
        }
    }

    /// Whether an API token is configured.
    pub fn has_credential(&self) -> bool {
        self.token_present
    }

    pub fn gateway(&self) -> &InferenceGateway {
        &self.gateway
    }

    /// Keyword-based suggestion for typed text. No network call.
    pub fn suggest_from_text(&self, raw: &str) -> Suggestion {
        parse::suggest_from_text(raw)
    }

    /// Run the full image pipeline.
    ///
    /// Inline base64 takes precedence over `reference`. The result holds at
    /// most three suggestions; when it holds none, `diagnostic` says why.
    #[instrument(skip_all, fields(route = %self.gateway.route()))]
    pub async fn suggest_from_image(
        &self,
        reference: &str,
        inline_base64: Option<&str>,
    ) -> SuggestionOutcome {
        let mut diag = Diagnostics::new();

        let mut suggestions = match self.run(reference, inline_base64, &mut diag).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "suggestion request failed");
                // The gateway already described network failures, CORS hint included.
                let detail = match (&e, diag.read()) {
                    (SuggestError::Http(_), Some(described)) => described.to_string(),
                    _ => e.to_string(),
                };
                diag.set(format!("AI request failed: {detail}"));
                Vec::new()
            }
        };
        suggestions.truncate(MAX_SUGGESTIONS);

        if suggestions.is_empty() {
            metrics::counter!(telemetry::EMPTY_RESULTS_TOTAL).increment(1);
        }

        let outcome = diag.into_outcome(suggestions);
        if let Ok(mut last) = self.last_diagnostic.lock() {
            last.clone_from(&outcome.diagnostic);
        }
        outcome
    }

    /// Diagnostic of the most recently completed image request.
    ///
    /// Concurrent requests race for this slot; prefer
    /// [`SuggestionOutcome::diagnostic`].
    pub fn last_diagnostic_message(&self) -> Option<String> {
        self.last_diagnostic
            .lock()
            .ok()
            .and_then(|last| last.clone())
    }

    async fn run(
        &self,
        reference: &str,
        inline_base64: Option<&str>,
        diag: &mut Diagnostics,
    ) -> Result<Vec<Suggestion>> {
        if !self.gateway.preflight(diag) {
            return Ok(Vec::new());
        }

        let has_inline = inline_base64.is_some_and(|b| !b.trim().is_empty());
        if !has_inline && reference.trim().is_empty() {
            diag.set(MISSING_IMAGE_MESSAGE);
            return Ok(Vec::new());
        }

        let image = self.normalizer.normalize(reference, inline_base64).await?;

        for mode in InferenceMode::ALL {
            let found = self.try_mode(mode, &image, diag).await?;
            if !found.is_empty() {
                metrics::counter!(telemetry::SUGGESTIONS_TOTAL, "mode" => mode.as_str())
                    .increment(found.len() as u64);
                info!(mode = %mode, count = found.len(), "suggestions found");
                return Ok(found);
            }
        }

        diag.set_if_empty(NOTHING_FOUND_MESSAGE);
        Ok(Vec::new())
    }

    async fn try_mode(
        &self,
        mode: InferenceMode,
        image: &str,
        diag: &mut Diagnostics,
    ) -> Result<Vec<Suggestion>> {
        let Some(body) = self.gateway.call(mode, image, diag).await? else {
            return Ok(Vec::new());
        };
        let text = extract_text(&body);

        match mode {
            InferenceMode::Ocr => {
                // The relay unwraps the `{"text": ..}` object itself.
                let transcription = match self.gateway.route() {
                    Route::Direct => unwrap_ocr_payload(&text),
                    Route::Relay => text,
                };
                let cleaned = clean_ocr_text(&transcription);
                if cleaned.is_empty() {
                    diag.set_if_empty(OCR_EMPTY_MESSAGE);
                    return Ok(Vec::new());
                }
                let found = parse_ocr_text(&cleaned);
                if found.is_empty() {
                    diag.set_if_empty(OCR_UNUSABLE_MESSAGE);
                }
                Ok(found)
            }
            InferenceMode::Caption => {
                let text = text.trim();
                if text.is_empty() {
                    diag.set_if_empty(CAPTION_EMPTY_MESSAGE);
                    return Ok(Vec::new());
                }
                let found = parse_caption_text(text);
                if found.is_empty() {
                    diag.set_if_empty(format!(
                        "Vision text received but no task suggestions parsed: {text}"
                    ));
                }
                Ok(found)
            }
        }
    }
}
