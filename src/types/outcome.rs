//! Result of an image suggestion request.

use serde::Serialize;

use super::attempt::InferenceAttempt;
use super::suggestion::Suggestion;

/// Everything a caller learns from one image request.
///
/// Absence of suggestions is never an error: `suggestions` is empty and
/// `diagnostic` explains why.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestionOutcome {
    /// At most three sanitized suggestions, in discovery order.
    pub suggestions: Vec<Suggestion>,
    /// First recorded explanation for a failure or empty result.
    pub diagnostic: Option<String>,
    /// Upstream calls made while serving the request.
    pub attempts: Vec<InferenceAttempt>,
}

impl SuggestionOutcome {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}
