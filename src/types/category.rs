//! Task category allow-list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category attached to a suggested task.
///
/// The set is closed: anything the model invents collapses to
/// [`Category::General`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Academic,
    Health,
    Finance,
    Work,
    #[default]
    General,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 6] = [
        Category::Personal,
        Category::Academic,
        Category::Health,
        Category::Finance,
        Category::Work,
        Category::General,
    ];

    /// Canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Academic => "Academic",
            Category::Health => "Health",
            Category::Finance => "Finance",
            Category::Work => "Work",
            Category::General => "General",
        }
    }

    /// Case-insensitive lookup against the allow-list.
    ///
    /// Surrounding whitespace is ignored; unknown input maps to `General`.
    pub fn normalize(raw: &str) -> Self {
        let key = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(key))
            .unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Category::normalize(raw)
    }
}
