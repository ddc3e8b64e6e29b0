//! Chat-completion request types for vision models.

use serde::Serialize;

/// Completion budget; suggestions and OCR payloads are short.
pub const MAX_TOKENS: u32 = 160;

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// A chat message carrying text and image parts.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl Message {
    /// A user message: prompt first, image second.
    pub fn user_with_image(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![
                ContentPart::Text {
                    text: prompt.into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ],
        }
    }
}

/// Body of a non-streaming chat-completion call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub stream: bool,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

impl ChatCompletionRequest {
    /// Single-turn request for `model` with one prompt and one image.
    pub fn vision(
        model: impl Into<String>,
        prompt: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            stream: false,
            max_tokens: MAX_TOKENS,
            messages: vec![Message::user_with_image(prompt, image_url)],
        }
    }
}
