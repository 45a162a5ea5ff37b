//! Moodlog core library.
//! Emotion classification, mood mapping, canned replies, mood-change insight and per-user history.

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod insight;
pub mod mood;
pub mod responses;

pub use analysis::{MoodAnalysisResult, MoodAnalysisService};
pub use classifier::{EmotionClassifier, EmotionScore, InferenceClassifier, KeywordClassifier};
pub use self::config::{ClassifierMode, MoodConfig};
pub use error::{MoodError, MoodResult};
pub use history::{
    HistoryStorage, HistoryStore, JsonFileStorage, MemoryStorage, MoodDistribution, MoodLogEntry,
    MoodStats, UserHistory,
};
pub use insight::track_mood_changes;
pub use mood::{map_mood, MoodCategory};
pub use responses::{canned_replies, ReplyPicker, ResponseGenerator, SeededPicker, ThreadRngPicker};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
