//! Labelling typed task text, no network involved.

use super::keywords::{TEXT_RULES, first_match};
use super::sanitize::title_case;
use crate::types::{Category, Suggestion};

/// Suggest a single title and category for freeform text.
///
/// Empty input yields "New Task"; text matching no keyword keeps its own
/// wording, title-cased, as a `General` task.
pub fn suggest_from_text(raw: &str) -> Suggestion {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Suggestion::new("New Task", Category::General);
    }
    match first_match(TEXT_RULES, trimmed) {
        Some(rule) => Suggestion::new(rule.title, rule.category),
        None => Suggestion::new(title_case(trimmed), Category::General),
    }
}
