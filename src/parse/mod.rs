//! Suggestion parsing.
//!
//! Each mode has an ordered chain of strategies. A strategy returns
//! `Some(list)` when it recognizes the text and `None` to defer to the next;
//! the first non-empty result wins.
//!
//! | Mode    | Chain                                                  |
//! |---------|--------------------------------------------------------|
//! | Caption | strict JSON array → bullet/numbered lines → keywords   |
//! | OCR     | first line → receipt set → notes set → word snippet    |

pub mod caption;
pub mod keywords;
pub mod ocr;
pub mod sanitize;
mod text;

pub use caption::strip_code_fences;
pub use ocr::clean_ocr_text;
pub use sanitize::{sanitize, title_case};
pub use text::suggest_from_text;

use crate::types::{InferenceMode, Suggestion};

/// Most suggestions returned for one image.
pub const MAX_SUGGESTIONS: usize = 3;

/// One parsing strategy.
pub type Strategy = fn(&str) -> Option<Vec<Suggestion>>;

pub const CAPTION_STRATEGIES: &[Strategy] =
    &[caption::from_json, caption::from_lines, caption::from_keywords];

pub const OCR_STRATEGIES: &[Strategy] = &[
    ocr::from_first_line,
    ocr::finance_set,
    ocr::notes_set,
    ocr::snippet,
];

/// Run `strategies` in order and keep the first non-empty result.
pub fn run_strategies(text: &str, strategies: &[Strategy]) -> Vec<Suggestion> {
    let mut found = strategies
        .iter()
        .find_map(|strategy| strategy(text).filter(|s| !s.is_empty()))
        .unwrap_or_default();
    found.truncate(MAX_SUGGESTIONS);
    found
}

/// Parse already-cleaned OCR text.
pub fn parse_ocr_text(cleaned: &str) -> Vec<Suggestion> {
    if cleaned.is_empty() {
        return Vec::new();
    }
    run_strategies(cleaned, OCR_STRATEGIES)
}

/// Parse a caption/vision model reply.
pub fn parse_caption_text(text: &str) -> Vec<Suggestion> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    run_strategies(text, CAPTION_STRATEGIES)
}

/// Turn extracted model text into at most three suggestions.
pub fn parse_suggestions(text: &str, mode: InferenceMode) -> Vec<Suggestion> {
    match mode {
        InferenceMode::Ocr => parse_ocr_text(&clean_ocr_text(text)),
        InferenceMode::Caption => parse_caption_text(text),
    }
}
