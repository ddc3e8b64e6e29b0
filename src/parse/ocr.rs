//! OCR-mode cleaning and classification.

use super::keywords::{FINANCE_KEYWORDS, NOTE_KEYWORDS};
use super::sanitize::{MAX_TITLE_CHARS, contains_any, is_prompt_echo, is_watermark_line, title_case};
use crate::types::{Category, Suggestion};

const FIRST_LINE_MAX_CHARS: usize = 70;
const SNIPPET_WORDS: usize = 8;
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// Strip code fences, boilerplate lead-ins, and redundant whitespace.
///
/// Returns an empty string when nothing but boilerplate remains.
pub fn clean_ocr_text(text: &str) -> String {
    let unfenced = remove_paired_fences(text);
    let mut cleaned = unfenced.trim();
    cleaned = strip_lead_in(cleaned, &["text", "recognition"], false, &[':']);
    cleaned = strip_lead_in(cleaned, &["the", "text", "in", "the", "image", "is"], true, &[':', '-']);
    cleaned = strip_lead_in(cleaned, &["ocr"], false, &[':', '-']);

    let collapsed = cleaned
        .replace("\r\n", "\n")
        .split('\n')
        .map(|line| {
            line.split([' ', '\t'])
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");
    let collapsed = collapsed.trim();

    if is_bare_recognition_label(collapsed) {
        return String::new();
    }
    collapsed.to_string()
}

/// First non-empty line as a single `General` task.
pub fn from_first_line(text: &str) -> Option<Vec<Suggestion>> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let len = line.chars().count();
    if !(3..=FIRST_LINE_MAX_CHARS).contains(&len)
        || is_prompt_echo(line)
        || is_watermark_line(line)
        || has_currency_amount(line)
    {
        return None;
    }

    let cleaned = line.trim_start_matches(|c: char| c == '-' || c == '*' || c.is_whitespace());
    (cleaned.chars().count() >= 3).then(|| vec![Suggestion::new(title_case(cleaned), Category::General)])
}

/// Receipts and bills.
pub fn finance_set(text: &str) -> Option<Vec<Suggestion>> {
    contains_any(&text.to_lowercase(), FINANCE_KEYWORDS).then(|| {
        vec![
            Suggestion::new("Review Receipt", Category::Finance),
            Suggestion::new("File Expense", Category::Finance),
            Suggestion::new("Update Budget", Category::Finance),
        ]
    })
}

/// Handwritten notes and reminders.
pub fn notes_set(text: &str) -> Option<Vec<Suggestion>> {
    contains_any(&text.to_lowercase(), NOTE_KEYWORDS).then(|| {
        vec![
            Suggestion::new("Review Notes", Category::General),
            Suggestion::new("Follow Up", Category::Work),
            Suggestion::new("Important Reminder", Category::Personal),
        ]
    })
}

/// The first few words of the text.
pub fn snippet(text: &str) -> Option<Vec<Suggestion>> {
    let words = text
        .split_whitespace()
        .take(SNIPPET_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    let snippet: String = words.chars().take(MAX_TITLE_CHARS).collect();
    let snippet = snippet.trim_end();

    if snippet.chars().count() < 3 || is_watermark_line(snippet) {
        return None;
    }
    Some(vec![Suggestion::new(title_case(snippet), Category::General)])
}

/// A currency symbol directly followed by a digit, e.g. `$12.00`.
fn has_currency_amount(line: &str) -> bool {
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if CURRENCY_SYMBOLS.contains(&c) && chars.peek().is_some_and(char::is_ascii_digit) {
            return true;
        }
    }
    false
}

/// Drop the markers of complete ``` pairs, keeping their contents.
fn remove_paired_fences(text: &str) -> String {
    let fences = text.matches("```").count();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    for _ in 0..fences - fences % 2 {
        if let Some(i) = rest.find("```") {
            out.push_str(&rest[..i]);
            rest = &rest[i + 3..];
        }
    }
    out.push_str(rest);
    out
}

/// Strip a case-insensitive lead-in phrase ending in one of `terminators`.
///
/// With `spaced`, the words must be separated by whitespace; otherwise
/// whitespace between them is optional. The input is returned unchanged
/// when the phrase does not match.
fn strip_lead_in<'a>(text: &'a str, words: &[&str], spaced: bool, terminators: &[char]) -> &'a str {
    let mut rest = text;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            let trimmed = rest.trim_start();
            if spaced && trimmed.len() == rest.len() {
                return text;
            }
            rest = trimmed;
        }
        match rest.get(..word.len()) {
            Some(head) if head.eq_ignore_ascii_case(word) => rest = &rest[word.len()..],
            _ => return text,
        }
    }
    match rest.trim_start().strip_prefix(terminators) {
        Some(after) => after.trim_start(),
        None => text,
    }
}

fn is_bare_recognition_label(text: &str) -> bool {
    let Some(rest) = text
        .get(..4)
        .filter(|head| head.eq_ignore_ascii_case("text"))
        .map(|_| text[4..].trim_start())
    else {
        return false;
    };
    match rest.get(..11) {
        Some(head) if head.eq_ignore_ascii_case("recognition") => {
            matches!(rest[11..].trim(), "" | ":")
        }
        _ => false,
    }
}
