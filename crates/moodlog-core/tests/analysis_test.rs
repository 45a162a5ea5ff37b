//! Integration test: Mood Analysis Service end to end with a scripted classifier.
//!
//! Scenario: "I am so happy today!" classified as joy (0.9), then a sad message,
//! then a third message. Checks mood, reply membership, insight progression and
//! the stored history.

use moodlog_core::{
    canned_replies, track_mood_changes, EmotionClassifier, EmotionScore, HistoryStore,
    KeywordClassifier, MemoryStorage, MoodAnalysisService, MoodCategory, MoodError, MoodResult,
    ResponseGenerator,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Returns queued rankings in order, one per call.
struct ScriptedClassifier {
    queue: Mutex<VecDeque<MoodResult<Vec<EmotionScore>>>>,
}

impl ScriptedClassifier {
    fn new(rankings: Vec<MoodResult<Vec<EmotionScore>>>) -> Self {
        Self {
            queue: Mutex::new(rankings.into()),
        }
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for ScriptedClassifier {
    async fn classify(&self, _text: &str) -> MoodResult<Vec<EmotionScore>> {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MoodError::Classifier("script exhausted".into())))
    }
}

fn ranking(labels: &[(&str, f64)]) -> Vec<EmotionScore> {
    labels.iter().map(|(l, s)| EmotionScore::new(*l, *s)).collect()
}

async fn service_with(classifier: Arc<dyn EmotionClassifier>) -> (MoodAnalysisService, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let history = Arc::new(HistoryStore::open(storage.clone()).await.unwrap());
    (
        MoodAnalysisService::new(classifier, ResponseGenerator::default(), history),
        storage,
    )
}

#[tokio::test]
async fn happy_then_sad_insight_progression() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Ok(ranking(&[("joy", 0.9), ("love", 0.05), ("gratitude", 0.03)])),
        Ok(ranking(&[("sadness", 0.8), ("grief", 0.1), ("remorse", 0.05)])),
        Ok(ranking(&[("joy", 0.7), ("neutral", 0.2)])),
        Ok(ranking(&[("joy", 0.75)])),
    ]));
    let (service, storage) = service_with(classifier).await;

    let first = service.analyze_mood("I am so happy today!", "u1").await.unwrap();
    assert_eq!(first.mood, MoodCategory::Happy);
    assert_eq!(first.emotion, "joy");
    assert!((first.confidence - 0.9).abs() < 1e-9);
    assert!(canned_replies(MoodCategory::Happy).contains(&first.response.as_str()));
    assert_eq!(first.insight, track_mood_changes(MoodCategory::Happy, &[]));
    assert_eq!(first.all_emotions.len(), 3);
    assert_eq!(first.all_emotions[1].emotion, "love");

    // One prior entry: generic message, no comparison.
    let second = service.analyze_mood("Everything went wrong.", "u1").await.unwrap();
    assert_eq!(second.mood, MoodCategory::Sad);
    assert_eq!(
        second.insight,
        "Thank you for sharing your feelings. Would you like to talk more about it?"
    );

    let third = service.analyze_mood("Back on track now.", "u1").await.unwrap();
    assert_eq!(
        third.insight,
        "I notice your mood has changed from sad to happy. How do you feel about this change?"
    );

    let fourth = service.analyze_mood("Still good.", "u1").await.unwrap();
    assert_eq!(
        fourth.insight,
        "I notice you're still feeling happy. Would you like to talk about it?"
    );

    let stored = &storage.snapshot()["u1"];
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[0].message, "I am so happy today!");
    assert_eq!(stored[1].emotion, "sadness");
    assert!((stored[1].confidence - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn two_prior_logs_then_change_is_reported() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Ok(ranking(&[("neutral", 0.6)])),
        Ok(ranking(&[("joy", 0.9)])),
        Ok(ranking(&[("sadness", 0.7)])),
    ]));
    let (service, _) = service_with(classifier).await;
    service.analyze_mood("ok", "u1").await.unwrap();
    service.analyze_mood("I am so happy today!", "u1").await.unwrap();
    let result = service.analyze_mood("now I'm sad", "u1").await.unwrap();
    assert_eq!(
        result.insight,
        "I notice your mood has changed from happy to sad. How do you feel about this change?"
    );
}

#[tokio::test]
async fn users_are_tracked_independently() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Ok(ranking(&[("anger", 0.9)])),
        Ok(ranking(&[("fear", 0.9)])),
    ]));
    let (service, _) = service_with(classifier).await;
    service.analyze_mood("grr", "a").await.unwrap();
    let b = service.analyze_mood("eek", "b").await.unwrap();
    assert_eq!(b.mood, MoodCategory::Anxious);
    assert_eq!(b.insight, track_mood_changes(MoodCategory::Anxious, &[]));
}

#[tokio::test]
async fn classifier_failure_propagates_without_logging() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![Err(MoodError::ClassifierStatus(
        503,
        "model loading".into(),
    ))]));
    let (service, storage) = service_with(classifier).await;
    let err = service.analyze_mood("hello", "u1").await.unwrap_err();
    assert!(err.to_string().contains("503"));
    assert!(storage.snapshot().is_empty());
    assert!(service.history().history("u1", None).await.is_empty());
}

#[tokio::test]
async fn keyword_classifier_end_to_end() {
    let (service, _) = service_with(Arc::new(KeywordClassifier::default())).await;
    let result = service.analyze_mood("I am so happy today!", "u1").await.unwrap();
    assert_eq!(result.mood, MoodCategory::Happy);
    assert_eq!(result.emotion, "joy");

    let stats = service.history().stats("u1").await;
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.most_common_mood, Some(MoodCategory::Happy));
}
