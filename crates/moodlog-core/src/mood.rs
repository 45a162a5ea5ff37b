//! Mood mapping: fine-grained emotion labels (go-emotions) to coarse mood categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse mood category derived from a classifier emotion label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodCategory {
    Positive,
    Happy,
    Angry,
    Irritated,
    Compassionate,
    Confused,
    Interested,
    Excited,
    Sad,
    Negative,
    Anxious,
    Neutral,
    Surprised,
}

impl MoodCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodCategory::Positive => "Positive",
            MoodCategory::Happy => "Happy",
            MoodCategory::Angry => "Angry",
            MoodCategory::Irritated => "Irritated",
            MoodCategory::Compassionate => "Compassionate",
            MoodCategory::Confused => "Confused",
            MoodCategory::Interested => "Interested",
            MoodCategory::Excited => "Excited",
            MoodCategory::Sad => "Sad",
            MoodCategory::Negative => "Negative",
            MoodCategory::Anxious => "Anxious",
            MoodCategory::Neutral => "Neutral",
            MoodCategory::Surprised => "Surprised",
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The 28 go-emotions labels and the mood each one maps to.
pub const EMOTION_MOODS: &[(&str, MoodCategory)] = &[
    ("admiration", MoodCategory::Positive),
    ("amusement", MoodCategory::Happy),
    ("anger", MoodCategory::Angry),
    ("annoyance", MoodCategory::Irritated),
    ("approval", MoodCategory::Positive),
    ("caring", MoodCategory::Compassionate),
    ("confusion", MoodCategory::Confused),
    ("curiosity", MoodCategory::Interested),
    ("desire", MoodCategory::Excited),
    ("disappointment", MoodCategory::Sad),
    ("disapproval", MoodCategory::Negative),
    ("disgust", MoodCategory::Angry),
    ("embarrassment", MoodCategory::Anxious),
    ("excitement", MoodCategory::Excited),
    ("fear", MoodCategory::Anxious),
    ("gratitude", MoodCategory::Happy),
    ("grief", MoodCategory::Sad),
    ("joy", MoodCategory::Happy),
    ("love", MoodCategory::Happy),
    ("nervousness", MoodCategory::Anxious),
    ("optimism", MoodCategory::Positive),
    ("pride", MoodCategory::Happy),
    ("realization", MoodCategory::Neutral),
    ("relief", MoodCategory::Positive),
    ("remorse", MoodCategory::Sad),
    ("sadness", MoodCategory::Sad),
    ("surprise", MoodCategory::Surprised),
    ("neutral", MoodCategory::Neutral),
];

/// Maps an emotion label to its mood. Lookup is case-insensitive; unknown labels are Neutral.
pub fn map_mood(emotion: &str) -> MoodCategory {
    let lower = emotion.to_lowercase();
    EMOTION_MOODS
        .iter()
        .find(|(label, _)| *label == lower)
        .map(|(_, mood)| *mood)
        .unwrap_or(MoodCategory::Neutral)
}
