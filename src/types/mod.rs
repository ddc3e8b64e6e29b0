//! Public types for the snaptask API.

mod attempt;
mod category;
mod message;
mod mode;
mod outcome;
mod suggestion;

pub use attempt::{AttemptResult, InferenceAttempt};
pub use category::Category;
pub use message::{ChatCompletionRequest, ContentPart, ImageUrl, MAX_TOKENS, Message, Role};
pub use mode::{CAPTION_PROMPT, InferenceMode, OCR_PROMPT, Route};
pub use outcome::SuggestionOutcome;
pub use suggestion::Suggestion;
