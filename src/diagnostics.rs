//! Per-request diagnostics.
//!
//! Each image request owns one [`Diagnostics`] value. It holds the
//! human-readable reason a request produced nothing, plus the upstream
//! attempts made along the way, and is folded into the
//! [`SuggestionOutcome`] returned to the caller. Nothing is shared between
//! concurrent requests.
//!
//! Two write modes exist:
//! - [`set`](Diagnostics::set) for specific failures (HTTP status, network
//!   error, missing credential), which replace any earlier message;
//! - [`set_if_empty`](Diagnostics::set_if_empty) for generic reasons ("no
//!   suggestions detected"), which never overwrite an earlier, more specific
//!   message.

use tracing::debug;

use crate::types::{InferenceAttempt, Suggestion, SuggestionOutcome};

/// Maximum characters of an upstream body kept in a diagnostic.
pub const MAX_BODY_CHARS: usize = 700;

#[derive(Debug, Default)]
pub struct Diagnostics {
    message: Option<String>,
    attempts: Vec<InferenceAttempt>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the message and attempt log.
    pub fn reset(&mut self) {
        self.message = None;
        self.attempts.clear();
    }

    /// Record a message, replacing any earlier one.
    pub fn set(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(diagnostic = %message, "diagnostic recorded");
        self.message = Some(message);
    }

    /// Record a message only if none has been set since the last reset.
    pub fn set_if_empty(&mut self, message: impl Into<String>) {
        if self.message.is_some() {
            return;
        }
        self.set(message);
    }

    /// The current message, if any.
    pub fn read(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn record_attempt(&mut self, attempt: InferenceAttempt) {
        self.attempts.push(attempt);
    }

    pub fn attempts(&self) -> &[InferenceAttempt] {
        &self.attempts
    }

    /// Package the request's result.
    pub fn into_outcome(self, suggestions: Vec<Suggestion>) -> SuggestionOutcome {
        SuggestionOutcome {
            suggestions,
            diagnostic: self.message,
            attempts: self.attempts,
        }
    }
}

/// Trim a response body and cap it at [`MAX_BODY_CHARS`] characters.
pub fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_if_empty_keeps_first_message() {
        let mut diag = Diagnostics::new();
        diag.set_if_empty("missing credential");
        diag.set_if_empty("no suggestions detected");
        assert_eq!(diag.read(), Some("missing credential"));
    }

    #[test]
    fn set_overwrites() {
        let mut diag = Diagnostics::new();
        diag.set("loading, retrying");
        diag.set("OCR HTTP 500: boom");
        assert_eq!(diag.read(), Some("OCR HTTP 500: boom"));
    }

    #[test]
    fn reset_clears_message() {
        let mut diag = Diagnostics::new();
        diag.set("first");
        diag.reset();
        assert_eq!(diag.read(), None);
        diag.set_if_empty("second");
        assert_eq!(diag.read(), Some("second"));
    }

    #[test]
    fn truncate_body_caps_long_bodies() {
        let long = "x".repeat(MAX_BODY_CHARS + 50);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), MAX_BODY_CHARS + 1);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncate_body("  short  "), "short");
    }
}
