//! Records of individual upstream calls.

use serde::Serialize;
use serde_json::Value;

use super::mode::{InferenceMode, Route};
use crate::SuggestError;

/// Result of one upstream call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptResult {
    Success { body: Value },
    Failure { status: u16, body: String },
    NetworkError { message: String },
}

impl AttemptResult {
    /// Classify a transport result.
    pub fn from_result(result: &Result<Value, SuggestError>) -> Self {
        match result {
            Ok(body) => AttemptResult::Success { body: body.clone() },
            Err(e) => match (e.status(), e.body()) {
                (Some(status), Some(body)) => AttemptResult::Failure {
                    status,
                    body: body.to_string(),
                },
                _ => AttemptResult::NetworkError {
                    message: e.to_string(),
                },
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptResult::Success { .. })
    }
}

/// One upstream call made while serving a suggestion request.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceAttempt {
    pub mode: InferenceMode,
    pub route: Route,
    /// Model identifier sent upstream.
    pub model: String,
    /// 1-based attempt number within the retry loop.
    pub attempt: u32,
    pub result: AttemptResult,
}
