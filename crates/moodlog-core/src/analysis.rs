//! Mood analysis: classify, map, reply, derive insight, log.

use crate::classifier::{EmotionClassifier, EmotionScore};
use crate::error::{MoodError, MoodResult};
use crate::history::{HistoryStore, MoodLogEntry};
use crate::insight::track_mood_changes;
use crate::mood::{map_mood, MoodCategory};
use crate::responses::ResponseGenerator;
use serde::Serialize;
use std::sync::Arc;

/// Returned to the caller of one analysis; only the derived log entry is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodAnalysisResult {
    pub mood: MoodCategory,
    pub emotion: String,
    pub confidence: f64,
    pub response: String,
    pub insight: String,
    pub all_emotions: Vec<EmotionScore>,
}

pub struct MoodAnalysisService {
    classifier: Arc<dyn EmotionClassifier>,
    responses: ResponseGenerator,
    history: Arc<HistoryStore>,
}

impl MoodAnalysisService {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        responses: ResponseGenerator,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            classifier,
            responses,
            history,
        }
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Analyses `text` for `user_id` and appends the outcome to the user's history.
    /// The insight reflects only entries logged before this call.
    pub async fn analyze_mood(&self, text: &str, user_id: &str) -> MoodResult<MoodAnalysisResult> {
        let all_emotions = self.classifier.classify(text).await?;
        let top = all_emotions.first().ok_or(MoodError::EmptyClassification)?;
        let emotion = top.emotion.clone();
        let confidence = top.score;

        let mood = map_mood(&emotion);
        let response = self.responses.generate(mood, &emotion).to_string();

        let entry = MoodLogEntry {
            mood,
            emotion: emotion.clone(),
            message: text.to_string(),
            confidence,
            timestamp: now_timestamp(),
        };
        let insight = self
            .history
            .record(user_id, move |prior| {
                let previous: Vec<MoodCategory> = prior.iter().map(|e| e.mood).collect();
                (entry, track_mood_changes(mood, &previous))
            })
            .await?;

        tracing::info!(
            target: "moodlog::analysis",
            user_id,
            mood = %mood,
            emotion = %emotion,
            confidence,
            "mood logged"
        );

        Ok(MoodAnalysisResult {
            mood,
            emotion,
            confidence,
            response,
            insight,
            all_emotions,
        })
    }
}

/// Local wall-clock time, microsecond precision (`2024-05-01 14:03:22.123456`).
fn now_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}
