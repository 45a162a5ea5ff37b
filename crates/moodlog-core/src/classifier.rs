//! Emotion classification: text in, ranked `(emotion, score)` pairs out.
//!
//! The hosted model is opaque. [`InferenceClassifier`] speaks the Hugging Face
//! text-classification shape; [`KeywordClassifier`] is an offline stand-in
//! over the same go-emotions label set.

use crate::error::{MoodError, MoodResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "SamLowe/roberta-base-go_emotions";
pub const DEFAULT_TOP_K: usize = 3;

/// One ranked classifier label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub emotion: String,
    pub score: f64,
}

impl EmotionScore {
    pub fn new(emotion: impl Into<String>, score: f64) -> Self {
        Self {
            emotion: emotion.into(),
            score,
        }
    }
}

/// Classifies text into emotion labels, highest score first.
#[async_trait::async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> MoodResult<Vec<EmotionScore>>;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct InferenceLabel {
    label: String,
    score: f64,
}

/// The endpoint answers `[[{label, score}, ..]]` for a single input; some
/// deployments drop the outer batch array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<InferenceLabel>>),
    Flat(Vec<InferenceLabel>),
}

impl InferenceResponse {
    fn into_labels(self) -> Vec<InferenceLabel> {
        match self {
            InferenceResponse::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(labels) => labels,
        }
    }
}

/// Hosted text-classification model (go-emotions by default).
pub struct InferenceClassifier {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
    top_k: usize,
}

impl InferenceClassifier {
    pub fn new(
        base_url: &str,
        model: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> MoodResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_token: api_token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            top_k: DEFAULT_TOP_K,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for InferenceClassifier {
    async fn classify(&self, text: &str) -> MoodResult<Vec<EmotionScore>> {
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters { top_k: self.top_k },
        };

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await?;
        let status = res.status();
        let raw = res.text().await?;
        if !status.is_success() {
            return Err(MoodError::ClassifierStatus(status.as_u16(), raw));
        }

        let parsed: InferenceResponse = serde_json::from_str(&raw)
            .map_err(|e| MoodError::Classifier(format!("unexpected response: {}", e)))?;
        let mut scores: Vec<EmotionScore> = parsed
            .into_labels()
            .into_iter()
            .map(|l| EmotionScore::new(l.label, l.score))
            .collect();
        rank(&mut scores, self.top_k);

        tracing::debug!(
            target: "moodlog::classifier",
            model = %self.model,
            labels = scores.len(),
            "inference classification complete"
        );
        Ok(scores)
    }
}

/// Sorts by descending score (stable for ties) and keeps the first `top_k`.
fn rank(scores: &mut Vec<EmotionScore>, top_k: usize) {
    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(top_k);
}

/// Keyword cues per go-emotions label. Order breaks score ties.
const KEYWORD_CUES: &[(&str, &[&str])] = &[
    ("joy", &["happy", "joy", "glad", "delighted", "great day", "cheerful"]),
    ("sadness", &["sad", "down", "unhappy", "depressed", "lonely", "crying"]),
    ("anger", &["angry", "furious", "mad", "rage", "hate"]),
    ("annoyance", &["annoyed", "irritated", "frustrated", "ugh"]),
    ("fear", &["afraid", "scared", "terrified", "fear"]),
    ("nervousness", &["nervous", "anxious", "worried", "anxiety", "stressed"]),
    ("gratitude", &["thank", "thanks", "grateful", "appreciate"]),
    ("love", &["love", "adore"]),
    ("excitement", &["excited", "can't wait", "thrilled", "pumped"]),
    ("optimism", &["hopeful", "optimistic", "looking forward"]),
    ("disappointment", &["disappointed", "let down"]),
    ("grief", &["grief", "mourning", "passed away", "loss"]),
    ("remorse", &["sorry", "regret", "apologize"]),
    ("confusion", &["confused", "don't understand", "unclear"]),
    ("curiosity", &["curious", "wonder", "interesting"]),
    ("surprise", &["surprised", "shocked", "wow", "unexpected"]),
    ("relief", &["relieved", "relief", "finally over"]),
    ("pride", &["proud", "accomplished"]),
    ("caring", &["care about", "take care", "support you"]),
    ("embarrassment", &["embarrassed", "ashamed", "awkward"]),
    ("disgust", &["disgusted", "gross", "disgusting"]),
    ("amusement", &["funny", "lol", "haha", "hilarious"]),
    ("admiration", &["amazing", "impressive", "admire"]),
    ("approval", &["agree", "good idea", "approve"]),
    ("disapproval", &["disagree", "disapprove", "not okay"]),
    ("desire", &["wish", "want to", "desire"]),
    ("realization", &["realized", "just noticed", "it hit me"]),
];

/// Offline classifier: counts keyword cues per label and normalises the counts into scores.
/// Text with no cue is `neutral` at 1.0.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    top_k: usize,
}

impl KeywordClassifier {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k: top_k.max(1),
        }
    }

    pub fn scores(&self, text: &str) -> Vec<EmotionScore> {
        let words = tokenize(text);
        let hits: Vec<(&str, usize)> = KEYWORD_CUES
            .iter()
            .map(|(label, cues)| (*label, cues.iter().filter(|c| cue_matches(&words, c)).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        let total: usize = hits.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return vec![EmotionScore::new("neutral", 1.0)];
        }

        let mut scores: Vec<EmotionScore> = hits
            .into_iter()
            .map(|(label, n)| EmotionScore::new(label, n as f64 / total as f64))
            .collect();
        rank(&mut scores, self.top_k);
        scores
    }
}

/// Lowercased words; apostrophes stay inside words ("can't", "i'm").
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whole-word match; multi-word cues must appear as consecutive words.
fn cue_matches(words: &[String], cue: &str) -> bool {
    let cue_words: Vec<&str> = cue.split_whitespace().collect();
    if cue_words.is_empty() || cue_words.len() > words.len() {
        return false;
    }
    words
        .windows(cue_words.len())
        .any(|w| w.iter().zip(&cue_words).all(|(a, b)| a == b))
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> MoodResult<Vec<EmotionScore>> {
        Ok(self.scores(text))
    }
}
