//! Suggestion types

use serde::{Deserialize, Serialize};

use super::category::Category;

/// A proposed task: short imperative title plus category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    #[serde(default)]
    pub category: Category,
}

impl Suggestion {
    /// Create a suggestion from a title and category.
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            category,
        }
    }
}
