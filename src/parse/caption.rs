//! Caption-mode strategies: strict JSON, then lines, then keywords.

use serde_json::Value;

use super::MAX_SUGGESTIONS;
use super::keywords::{CAPTION_RULES, first_match};
use super::sanitize::{apply_dish_rule, sanitize_title};
use crate::types::{Category, Suggestion};

/// Remove Markdown code fence markers (and their language tag).
///
/// A tag is only recognized when it is the whole remainder of the fence
/// line, so "```Do laundry" keeps its text.
pub fn strip_code_fences(text: &str) -> String {
    text.lines()
        .map(|line| {
            let mut line = line;
            if let Some(rest) = line.trim_start().strip_prefix("```") {
                line = if is_language_tag(rest.trim_end()) { "" } else { rest };
            }
            if let Some(rest) = line.trim_end().strip_suffix("```") {
                line = rest;
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_language_tag(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_' | '.'))
}

/// The first balanced `[...]` substring, found by bracket depth.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    for (i, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a JSON array of `{title, category}` objects.
pub fn from_json(text: &str) -> Option<Vec<Suggestion>> {
    let raw = strip_code_fences(text);
    let candidate = extract_json_array(&raw)?;
    let items: Vec<Value> = serde_json::from_str(candidate).ok()?;

    let accepted: Vec<Suggestion> = items
        .iter()
        .filter_map(|item| {
            let title = item.get("title").and_then(Value::as_str).unwrap_or_default();
            let category = item
                .get("category")
                .and_then(Value::as_str)
                .map(Category::normalize)
                .unwrap_or_default();
            sanitize_title(title).map(|title| Suggestion::new(title, category))
        })
        .take(MAX_SUGGESTIONS)
        .collect();

    non_empty(apply_dish_rule(accepted))
}

/// Treat each bullet or numbered line as a `General` title.
pub fn from_lines(text: &str) -> Option<Vec<Suggestion>> {
    let raw = strip_code_fences(text);
    let accepted: Vec<Suggestion> = raw
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty() && !line.starts_with('{') && !line.starts_with('['))
        .filter_map(sanitize_title)
        .map(|title| Suggestion::new(title, Category::General))
        .take(MAX_SUGGESTIONS)
        .collect();

    non_empty(apply_dish_rule(accepted))
}

/// Map the caption onto the keyword table.
pub fn from_keywords(text: &str) -> Option<Vec<Suggestion>> {
    first_match(CAPTION_RULES, text).map(|rule| vec![Suggestion::new(rule.title, rule.category)])
}

/// Strip `- `, `* ` and `1. ` / `2) ` prefixes.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim_start_matches(|c: char| c == '-' || c == '*' || c.is_whitespace());
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')']) {
            if after.starts_with(char::is_whitespace) {
                return after.trim();
            }
        }
    }
    line.trim()
}

fn non_empty(suggestions: Vec<Suggestion>) -> Option<Vec<Suggestion>> {
    (!suggestions.is_empty()).then_some(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(
            strip_code_fences("```json\n[{\"title\":\"Do laundry\"}]\n```"),
            "[{\"title\":\"Do laundry\"}]"
        );
        assert_eq!(strip_code_fences("no fences"), "no fences");
    }

    #[test]
    fn fence_keeps_text_on_the_fence_line() {
        assert_eq!(strip_code_fences("```Do laundry\nPay rent```"), "Do laundry\nPay rent");
        assert_eq!(strip_code_fences("```JSON \n[]\n```"), "[]");
        assert_eq!(
            from_lines("```Do laundry\nPay rent\n```"),
            Some(vec![
                Suggestion::new("Do Laundry", Category::General),
                Suggestion::new("Pay Rent", Category::General),
            ])
        );
    }

    #[test]
    fn json_array_by_bracket_depth() {
        assert_eq!(
            extract_json_array("Sure! [[1], [2]] trailing ]"),
            Some("[[1], [2]]")
        );
        assert_eq!(extract_json_array("[unterminated"), None);
        assert_eq!(extract_json_array("nothing"), None);
    }

    #[test]
    fn json_titles_are_sanitized_and_categorized() {
        let text = r#"Here you go:
```json
[{"title":"wash the dishes","category":"personal"},
 {"title":"Prepare meal","category":"Personal"},
 {"title":"A photo of a sink","category":"General"},
 {"title":"Pay water bill","category":"HEALTH "},
 {"title":"Book flights","category":"travel"}]
```"#;
        let out = from_json(text).unwrap();
        assert_eq!(
            out,
            vec![
                Suggestion::new("Wash The Dishes", Category::Personal),
                Suggestion::new("Pay Water Bill", Category::Health),
            ]
        );
    }

    #[test]
    fn json_missing_category_defaults_to_general() {
        let out = from_json(r#"[{"title":"Water plants"}]"#).unwrap();
        assert_eq!(out, vec![Suggestion::new("Water Plants", Category::General)]);
    }

    #[test]
    fn empty_or_invalid_json_yields_none() {
        assert_eq!(from_json("[]"), None);
        assert_eq!(from_json("[{\"title\": }]"), None);
        assert_eq!(from_json("{\"title\":\"x\"}"), None);
    }

    #[test]
    fn lines_strip_markers() {
        let out = from_lines("1. clean the kitchen\n- take out trash\n* {\"title\":1}\n2) call plumber\nfeed cat")
            .unwrap();
        assert_eq!(
            out,
            vec![
                Suggestion::new("Clean The Kitchen", Category::General),
                Suggestion::new("Take Out Trash", Category::General),
                Suggestion::new("Call Plumber", Category::General),
            ]
        );
    }

    #[test]
    fn lines_skip_watermarks_and_descriptions() {
        assert_eq!(
            from_lines("a pile of laundry on the chair\nshutterstock\nimage id 123"),
            None
        );
    }

    #[test]
    fn keyword_fallback() {
        assert_eq!(
            from_keywords("a pile of laundry on the chair"),
            Some(vec![Suggestion::new("Do Laundry", Category::Personal)])
        );
        assert_eq!(from_keywords("a sunset over the ocean"), None);
    }
}
