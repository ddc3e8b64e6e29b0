//! Title sanitization.

use super::MAX_SUGGESTIONS;
use super::keywords::WATERMARK_SIGNATURES;
use crate::types::Suggestion;

pub const MIN_TITLE_CHARS: usize = 3;
pub const MAX_TITLE_CHARS: usize = 80;

const ARTICLE_PREFIXES: &[&str] = &["a ", "an ", "the "];
const DESCRIPTIVE_WORDS: &[&str] = &["photo", "picture", "image"];
const PROMPT_ECHO_PREFIXES: &[&str] = &["text recognition", "describe this image"];

const DISH_WORDS: &[&str] = &["dish", "sink"];
const MEAL_WORDS: &[&str] = &["meal", "cook", "prepare", "recipe"];

/// Collapse whitespace and capitalize each word, lowercasing the rest.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Whether a line carries a stock-photo watermark.
pub fn is_watermark_line(line: &str) -> bool {
    contains_any(&line.trim().to_lowercase(), WATERMARK_SIGNATURES)
}

/// Whether a line is the model echoing its instructions.
pub fn is_prompt_echo(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    PROMPT_ECHO_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Whether a title describes the photo instead of naming a task.
pub fn is_descriptive(title: &str) -> bool {
    let lower = title.trim().to_lowercase();
    lower.is_empty()
        || ARTICLE_PREFIXES.iter().any(|p| lower.starts_with(p))
        || contains_any(&lower, DESCRIPTIVE_WORDS)
}

/// Validate and title-case a candidate title.
///
/// Rejects titles outside 3–80 characters, watermark lines, and
/// descriptive phrasing.
pub fn sanitize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !within_bounds(trimmed) || is_watermark_line(trimmed) || is_descriptive(trimmed) {
        return None;
    }
    let title = title_case(trimmed);
    within_bounds(&title).then_some(title)
}

/// Drop meal-prep suggestions when a dishwashing one is present.
pub fn apply_dish_rule(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let has_dishes = suggestions
        .iter()
        .any(|s| contains_any(&s.title.to_lowercase(), DISH_WORDS));
    if !has_dishes {
        return suggestions;
    }
    suggestions
        .into_iter()
        .filter(|s| !contains_any(&s.title.to_lowercase(), MEAL_WORDS))
        .collect()
}

/// Re-validate a suggestion list: sanitize titles, cap the length, and apply
/// the dish rule. Clean input passes through unchanged.
pub fn sanitize(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let accepted = suggestions
        .into_iter()
        .filter_map(|s| sanitize_title(&s.title).map(|title| Suggestion::new(title, s.category)))
        .take(MAX_SUGGESTIONS)
        .collect();
    apply_dish_rule(accepted)
}

fn within_bounds(title: &str) -> bool {
    (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&title.chars().count())
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
