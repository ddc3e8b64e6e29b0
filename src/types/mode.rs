//! Inference modes and the prompts bound to them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prompt asking the model to transcribe visible text as `{"text": "..."}`.
pub const OCR_PROMPT: &str = "Extract any text you can read from the image. \
Return ONLY a JSON object of the exact form: {\"text\":\"...\"}. \
If there is no readable text, return {\"text\":\"\"}. \
Do not add explanations, markdown, or extra keys.";

/// Prompt asking the model for up to three imperative task suggestions.
pub const CAPTION_PROMPT: &str = "You are a task assistant. Based on the image, suggest up to 3 tasks the user should create. \
Return ONLY a JSON array of objects in this exact shape: [{\"title\":\"...\",\"category\":\"Personal|Academic|Health|Finance|Work|General\"}]. \
Titles must be imperative actions (e.g., \"Do laundry\", \"Wash the dishes\"). \
Do NOT describe the image or mention \"photo\"/\"picture\". Do NOT add explanations or markdown. \
Only suggest tasks that are strongly implied by the image; if you are not confident, return []. \
Examples: if you see a laundry hamper/clothes -> [{\"title\":\"Do laundry\",...}]. If you see dirty dishes/sink -> [{\"title\":\"Wash the dishes\",...}].";

/// Which upstream capability a call exercises.
///
/// Both modes may hit the same endpoint; they differ by prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    /// Transcribe visible text.
    Ocr,
    /// Infer an implied task from the scene.
    Caption,
}

impl InferenceMode {
    /// Modes in the order the engine tries them.
    pub const ALL: [InferenceMode; 2] = [InferenceMode::Ocr, InferenceMode::Caption];

    /// Prompt sent with this mode.
    pub fn prompt(&self) -> &'static str {
        match self {
            InferenceMode::Ocr => OCR_PROMPT,
            InferenceMode::Caption => CAPTION_PROMPT,
        }
    }

    /// Relay path serving this mode.
    pub fn relay_path(&self) -> &'static str {
        match self {
            InferenceMode::Ocr => "/ocr",
            InferenceMode::Caption => "/caption",
        }
    }

    /// Human-readable label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            InferenceMode::Ocr => "OCR",
            InferenceMode::Caption => "Caption",
        }
    }

    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceMode::Ocr => "ocr",
            InferenceMode::Caption => "caption",
        }
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a request reaches the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Straight to the provider with a bearer token.
    Direct,
    /// Through the same-origin local relay.
    Relay,
}

impl Route {
    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Direct => "direct",
            Route::Relay => "relay",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
