//! Plain-text extraction from upstream response bodies.

use serde_json::Value;

use crate::parse::strip_code_fences;

/// Pull the generated text out of an upstream body.
///
/// Shapes are tried in priority order:
/// 1. `[{"generated_text": ..}]` or `[{"text": ..}]` (first element only)
/// 2. `{"generated_text": ..}`
/// 3. `{"text": ..}`
/// 4. `{"choices": [{"message": {"content": ..}}]}`
///
/// Anything else yields an empty string.
pub fn extract_text(body: &Value) -> String {
    if let Some(items) = body.as_array() {
        return items
            .first()
            .and_then(|first| {
                first
                    .get("generated_text")
                    .filter(|v| !v.is_null())
                    .or_else(|| first.get("text"))
            })
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
    }

    let text = body
        .get("generated_text")
        .and_then(Value::as_str)
        .or_else(|| body.get("text").and_then(Value::as_str))
        .or_else(|| body.pointer("/choices/0/message/content").and_then(Value::as_str));
    text.unwrap_or_default().to_string()
}

/// Unwrap the `{"text": ".."}` object the OCR prompt asks for.
///
/// Content without any object is treated as the transcription itself.
/// Content with an object that does not parse, or lacks a string `text`,
/// yields "". Only direct-route replies need this; the relay answers with
/// the unwrapped text.
pub fn unwrap_ocr_payload(content: &str) -> String {
    let stripped = strip_code_fences(content);
    let Some(start) = stripped.find('{') else {
        return stripped.trim().to_string();
    };
    let Some(end) = stripped.rfind('}').filter(|&end| end > start) else {
        return String::new();
    };

    serde_json::from_str::<Value>(&stripped[start..=end])
        .ok()
        .and_then(|v| v.get("text").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default()
}
