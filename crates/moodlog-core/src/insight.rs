//! Mood-change insight: one templated sentence comparing the new mood with prior logs.

use crate::mood::MoodCategory;

pub const FIRST_LOG_INSIGHT: &str =
    "This is your first mood log. Keep sharing how you feel to track your emotional journey!";

pub const GENERIC_INSIGHT: &str =
    "Thank you for sharing your feelings. Would you like to talk more about it?";

/// Insight for `current` given the user's earlier moods (oldest first).
///
/// Only histories of two or more entries are compared against the last mood;
/// a single prior entry gets the generic message.
pub fn track_mood_changes(current: MoodCategory, previous: &[MoodCategory]) -> String {
    if previous.is_empty() {
        return FIRST_LOG_INSIGHT.to_string();
    }

    if previous.len() >= 2 {
        if let Some(last) = previous.last() {
            let current_lower = current.as_str().to_lowercase();
            if *last == current {
                return format!(
                    "I notice you're still feeling {}. Would you like to talk about it?",
                    current_lower
                );
            }
            return format!(
                "I notice your mood has changed from {} to {}. How do you feel about this change?",
                last.as_str().to_lowercase(),
                current_lower
            );
        }
    }

    GENERIC_INSIGHT.to_string()
}
