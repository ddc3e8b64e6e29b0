//! Keyword tables.
//!
//! These lists were tuned against sample photos and captions. Order matters:
//! the first rule with a matching keyword wins, and matching is plain
//! substring search on the lowercased text (so "bin" also hits "cabinet").

use crate::types::Category;

/// Keywords mapped to one fixed suggestion.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub title: &'static str,
    pub category: Category,
}

impl KeywordRule {
    pub fn matches(&self, lower: &str) -> bool {
        self.keywords.iter().any(|k| lower.contains(k))
    }
}

const fn rule(
    keywords: &'static [&'static str],
    title: &'static str,
    category: Category,
) -> KeywordRule {
    KeywordRule {
        keywords,
        title,
        category,
    }
}

/// First matching rule for `text`, compared case-insensitively.
pub fn first_match<'a>(rules: &'a [KeywordRule], text: &str) -> Option<&'a KeywordRule> {
    let lower = text.to_lowercase();
    rules.iter().find(|r| r.matches(&lower))
}

/// Last-resort mapping from a scene caption to a task.
pub const CAPTION_RULES: &[KeywordRule] = &[
    // Household
    rule(
        &["laundry", "clothes", "clothing", "hamper", "washing machine"],
        "Do Laundry",
        Category::Personal,
    ),
    rule(
        &["dish", "dishes", "sink", "plate", "dirty cup"],
        "Wash The Dishes",
        Category::Personal,
    ),
    rule(
        &["vacuum", "mop", "broom", "dusty", "sweep"],
        "Clean The House",
        Category::Personal,
    ),
    rule(
        &["trash", "garbage", "bin", "rubbish"],
        "Take Out Trash",
        Category::Personal,
    ),
    rule(&["iron", "ironing", "wrinkle"], "Iron Clothes", Category::Personal),
    // Finance
    rule(
        &["receipt", "invoice", "bill", "payment"],
        "Review Receipt",
        Category::Finance,
    ),
    // Academic
    rule(
        &["book", "notebook", "paper", "document", "textbook"],
        "Review Notes",
        Category::Academic,
    ),
    rule(
        &["homework", "assignment", "exam", "study"],
        "Complete Assignment",
        Category::Academic,
    ),
    rule(
        &["laptop", "computer", "code", "programming"],
        "Finish Project",
        Category::Work,
    ),
    // Health
    rule(
        &["gym", "dumbbell", "treadmill", "exercise", "workout"],
        "Go To The Gym",
        Category::Health,
    ),
    rule(
        &["medicine", "pill", "prescription", "pharmacy"],
        "Take Medication",
        Category::Health,
    ),
    // Errands
    rule(
        &["grocery", "market", "shopping", "cart", "supermarket"],
        "Go Grocery Shopping",
        Category::Personal,
    ),
    rule(
        &["car", "vehicle", "gas", "fuel"],
        "Car Maintenance",
        Category::Personal,
    ),
    rule(
        &["package", "parcel", "mail", "delivery"],
        "Pick Up Package",
        Category::Personal,
    ),
    rule(
        &["plant", "garden", "flower", "water"],
        "Water The Plants",
        Category::Personal,
    ),
    rule(&["dog", "cat", "pet", "feed"], "Feed The Pet", Category::Personal),
    // Kitchen, only reached when no dish keyword matched
    rule(
        &["food", "meal", "kitchen", "cook"],
        "Prepare Meal",
        Category::Personal,
    ),
];

/// Mapping used when labelling typed task text.
pub const TEXT_RULES: &[KeywordRule] = &[
    // Household
    rule(&["dish", "dishes", "sink"], "Wash the Dishes", Category::Personal),
    rule(&["laundry", "clothes", "washing"], "Do Laundry", Category::Personal),
    rule(
        &["vacuum", "mop", "clean", "sweep"],
        "Clean the House",
        Category::Personal,
    ),
    rule(
        &["trash", "garbage", "rubbish"],
        "Take Out Trash",
        Category::Personal,
    ),
    rule(&["iron", "ironing"], "Iron Clothes", Category::Personal),
    rule(
        &["cook", "meal", "food", "dinner"],
        "Prepare Meal",
        Category::Personal,
    ),
    // Academic
    rule(&["study", "exam", "test"], "Study Session", Category::Academic),
    rule(
        &["homework", "assignment"],
        "Complete Assignment",
        Category::Academic,
    ),
    rule(&["read", "book", "notes"], "Review Notes", Category::Academic),
    // Health
    rule(&["gym", "workout", "exercise"], "Gym Workout", Category::Health),
    rule(&["run", "jog"], "Go For A Run", Category::Health),
    rule(
        &["medicine", "pill", "doctor"],
        "Take Medication",
        Category::Health,
    ),
    // Finance
    rule(
        &["bill", "payment", "receipt", "invoice"],
        "Review Receipt",
        Category::Finance,
    ),
    rule(&["budget", "expense"], "Update Budget", Category::Finance),
    // Work
    rule(&["meeting", "call"], "Attend Meeting", Category::Work),
    rule(&["email", "reply"], "Reply To Emails", Category::Work),
    rule(&["project", "deadline"], "Finish Project", Category::Work),
    // Errands
    rule(
        &["shop", "grocery", "market"],
        "Go Grocery Shopping",
        Category::Personal,
    ),
    rule(&["car", "gas", "fuel"], "Car Maintenance", Category::Personal),
    rule(
        &["plant", "water", "garden"],
        "Water The Plants",
        Category::Personal,
    ),
    rule(
        &["pet", "dog", "cat", "feed"],
        "Feed The Pet",
        Category::Personal,
    ),
    rule(
        &["package", "mail", "delivery"],
        "Pick Up Package",
        Category::Personal,
    ),
];

/// OCR text that looks like a receipt or bill.
pub const FINANCE_KEYWORDS: &[&str] = &[
    "receipt", "total", "tax", "subtotal", "payment", "store", "grocery", "market",
];

/// OCR text that looks like a note or reminder.
pub const NOTE_KEYWORDS: &[&str] = &["todo", "note", "reminder", "remember", "call", "meeting"];

/// Stock-photo watermark signatures.
pub const WATERMARK_SIGNATURES: &[&str] = &[
    "istock",
    "shutterstock",
    "getty",
    "dreamstime",
    "alamy",
    "depositphotos",
    "123rf",
    "adobe stock",
    "credit",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_rules_win() {
        // "dish" and "meal" both present: the dish rule comes first.
        let hit = first_match(CAPTION_RULES, "a meal next to dirty dishes").unwrap();
        assert_eq!(hit.title, "Wash The Dishes");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let hit = first_match(CAPTION_RULES, "A LAUNDRY basket").unwrap();
        assert_eq!(hit.title, "Do Laundry");
        assert_eq!(hit.category, Category::Personal);
    }

    #[test]
    fn no_match() {
        assert!(first_match(CAPTION_RULES, "a sunset over the ocean").is_none());
    }
}
