//! Canned conversational replies keyed by mood.
//!
//! Selection is uniform over the mood's list. The random source sits behind
//! [`ReplyPicker`] so callers (and tests) can seed it or replace it outright.

use crate::mood::MoodCategory;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

const HAPPY_REPLIES: &[&str] = &[
    "I'm glad you're feeling happy! What's bringing joy to your day?",
    "That's wonderful! Would you like to share what's making you feel this way?",
    "Your happiness is contagious! What's the highlight of your day?",
];

const SAD_REPLIES: &[&str] = &[
    "I hear that you're feeling down. Would you like to talk about what's troubling you?",
    "It's okay to feel sad sometimes. I'm here to listen if you want to share.",
    "I'm sorry you're feeling sad. Is there something specific that's causing these feelings?",
];

const ANXIOUS_REPLIES: &[&str] = &[
    "I notice you're feeling anxious. Remember to take deep breaths. Want to talk about what's on your mind?",
    "Anxiety can be overwhelming. Would you like to discuss what's making you feel this way?",
    "It's normal to feel anxious sometimes. Is there something specific that's causing your anxiety?",
];

const ANGRY_REPLIES: &[&str] = &[
    "I can sense that you're frustrated. Would you like to talk about what's bothering you?",
    "It's okay to feel angry. Would you like to share what triggered these feelings?",
    "I understand you're feeling angry. Let's talk about what's causing this emotion.",
];

const POSITIVE_REPLIES: &[&str] = &[
    "It's great to see you in such a positive mood! What's contributing to these good feelings?",
    "Your positive attitude is wonderful! Would you like to share what's going well?",
    "I'm glad you're feeling positive! What's making you feel this way?",
];

const NEUTRAL_REPLIES: &[&str] = &[
    "How has your day been going so far?",
    "Would you like to talk about anything specific?",
    "I'm here to listen if you'd like to share your thoughts.",
];

/// Replies for `mood`. Moods without their own list use the Neutral list.
pub fn canned_replies(mood: MoodCategory) -> &'static [&'static str] {
    match mood {
        MoodCategory::Happy => HAPPY_REPLIES,
        MoodCategory::Sad => SAD_REPLIES,
        MoodCategory::Anxious => ANXIOUS_REPLIES,
        MoodCategory::Angry => ANGRY_REPLIES,
        MoodCategory::Positive => POSITIVE_REPLIES,
        _ => NEUTRAL_REPLIES,
    }
}

/// Chooses an index in `0..len`. `len` is never zero.
pub trait ReplyPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl ReplyPicker for ThreadRngPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible choice from a seeded `StdRng`.
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ReplyPicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len),
            Err(poisoned) => poisoned.into_inner().gen_range(0..len),
        }
    }
}

/// Picks a canned reply for a detected mood.
#[derive(Clone)]
pub struct ResponseGenerator {
    picker: Arc<dyn ReplyPicker>,
}

impl ResponseGenerator {
    pub fn new(picker: Arc<dyn ReplyPicker>) -> Self {
        Self { picker }
    }

    /// Seeded generator when `seed` is set, thread RNG otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(Arc::new(SeededPicker::new(seed))),
            None => Self::default(),
        }
    }

    /// `_emotion` is carried for API symmetry with the classifier output; selection uses only `mood`.
    pub fn generate(&self, mood: MoodCategory, _emotion: &str) -> &'static str {
        let replies = canned_replies(mood);
        let idx = self.picker.pick(replies.len()).min(replies.len() - 1);
        replies[idx]
    }
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngPicker))
    }
}
