//! Gateway configuration loaded from file and environment.
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | host | MOODLOG__HOST | 127.0.0.1 |
//! | port | MOODLOG__PORT | 8000 |
//! | history_path | MOODLOG__HISTORY_PATH | ./data/mood_history.json |
//! | classifier_mode | MOODLOG__CLASSIFIER_MODE | remote |
//! | classifier_url | MOODLOG__CLASSIFIER_URL | Hugging Face inference API |
//! | classifier_model | MOODLOG__CLASSIFIER_MODEL | SamLowe/roberta-base-go_emotions |
//! | classifier_top_k | MOODLOG__CLASSIFIER_TOP_K | 3 |
//! | classifier_timeout_secs | MOODLOG__CLASSIFIER_TIMEOUT_SECS | 30 |
//! | api_token | MOODLOG__API_TOKEN or HF_API_TOKEN | unset |
//! | reply_seed | MOODLOG__REPLY_SEED | unset |

use crate::classifier::{
    EmotionClassifier, InferenceClassifier, KeywordClassifier, DEFAULT_INFERENCE_URL,
    DEFAULT_MODEL, DEFAULT_TOP_K,
};
use crate::error::{MoodError, MoodResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/moodlog";

/// Which classifier backs `/analyze-mood`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Hosted inference endpoint.
    Remote,
    /// Offline keyword scorer.
    Keyword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodConfig {
    pub host: String,
    pub port: u16,
    pub history_path: String,
    pub classifier_mode: ClassifierMode,
    pub classifier_url: String,
    pub classifier_model: String,
    pub classifier_top_k: usize,
    pub classifier_timeout_secs: u64,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub reply_seed: Option<u64>,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            history_path: "./data/mood_history.json".to_string(),
            classifier_mode: ClassifierMode::Remote,
            classifier_url: DEFAULT_INFERENCE_URL.to_string(),
            classifier_model: DEFAULT_MODEL.to_string(),
            classifier_top_k: DEFAULT_TOP_K,
            classifier_timeout_secs: 30,
            api_token: None,
            reply_seed: None,
        }
    }
}

impl MoodConfig {
    /// Precedence: env `MOODLOG__*` > file (`MOODLOG_CONFIG` or `config/moodlog.toml`) > defaults.
    /// `HF_API_TOKEN` fills `api_token` when nothing else set it.
    pub fn load() -> MoodResult<Self> {
        let config_path =
            std::env::var("MOODLOG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("history_path", defaults.history_path)?
            .set_default("classifier_mode", "remote")?
            .set_default("classifier_url", defaults.classifier_url)?
            .set_default("classifier_model", defaults.classifier_model)?
            .set_default("classifier_top_k", defaults.classifier_top_k as i64)?
            .set_default("classifier_timeout_secs", defaults.classifier_timeout_secs as i64)?;

        let path = Path::new(&config_path);
        let with_ext = path.with_extension("toml");
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else if with_ext.exists() {
            builder.add_source(config::File::from(with_ext.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("MOODLOG").separator("__"))
            .build()?;

        let mut cfg: Self = built.try_deserialize()?;
        if cfg.api_token.is_none() {
            cfg.api_token = env_opt_string("HF_API_TOKEN");
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> MoodResult<()> {
        if self.classifier_top_k == 0 {
            return Err(MoodError::Config("classifier_top_k must be at least 1".into()));
        }
        if self.history_path.trim().is_empty() {
            return Err(MoodError::Config("history_path must not be empty".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Classifier selected by `classifier_mode`.
    pub fn build_classifier(&self) -> MoodResult<Arc<dyn EmotionClassifier>> {
        Ok(match self.classifier_mode {
            ClassifierMode::Remote => Arc::new(
                InferenceClassifier::new(
                    &self.classifier_url,
                    &self.classifier_model,
                    self.api_token.clone(),
                    Duration::from_secs(self.classifier_timeout_secs),
                )?
                .with_top_k(self.classifier_top_k),
            ),
            ClassifierMode::Keyword => Arc::new(KeywordClassifier::new(self.classifier_top_k)),
        })
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
