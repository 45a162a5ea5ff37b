//! Per-user mood history: an in-memory map backed by a pluggable full-snapshot storage.
//!
//! The whole map is loaded once at startup and rewritten in full after every
//! append. All mutation runs under one async mutex, so a read-derive-append-persist
//! sequence is atomic with respect to other requests.

use crate::error::{MoodError, MoodResult};
use crate::mood::MoodCategory;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const DEFAULT_HISTORY_PATH: &str = "./data/mood_history.json";

/// One analysed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodLogEntry {
    pub mood: MoodCategory,
    pub emotion: String,
    pub message: String,
    pub confidence: f64,
    pub timestamp: String,
}

/// `user_id` -> entries, oldest first.
pub type UserHistory = HashMap<String, Vec<MoodLogEntry>>;

/// Mood counts in first-occurrence order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodDistribution(Vec<(MoodCategory, usize)>);

impl MoodDistribution {
    fn record(&mut self, mood: MoodCategory) {
        match self.0.iter_mut().find(|(m, _)| *m == mood) {
            Some((_, count)) => *count += 1,
            None => self.0.push((mood, 1)),
        }
    }

    pub fn get(&self, mood: MoodCategory) -> usize {
        self.0
            .iter()
            .find(|(m, _)| *m == mood)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MoodCategory, usize)> + '_ {
        self.0.iter().copied()
    }

    /// Highest count; the earliest-seen mood wins a tie.
    pub fn most_common(&self) -> Option<MoodCategory> {
        let mut best: Option<(MoodCategory, usize)> = None;
        for (mood, count) in self.iter() {
            if best.map_or(true, |(_, n)| count > n) {
                best = Some((mood, count));
            }
        }
        best.map(|(mood, _)| mood)
    }
}

impl Serialize for MoodDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (mood, count) in &self.0 {
            map.serialize_entry(mood.as_str(), count)?;
        }
        map.end()
    }
}

/// Aggregates over one user's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodStats {
    pub total_entries: usize,
    pub mood_distribution: MoodDistribution,
    pub most_common_mood: Option<MoodCategory>,
    pub average_confidence: f64,
}

impl MoodStats {
    /// Result for a user with no history.
    pub fn empty() -> Self {
        Self {
            total_entries: 0,
            mood_distribution: MoodDistribution::default(),
            most_common_mood: None,
            average_confidence: 0.0,
        }
    }

    pub fn from_entries(entries: &[MoodLogEntry]) -> Self {
        if entries.is_empty() {
            return Self::empty();
        }
        let mut distribution = MoodDistribution::default();
        let mut total_confidence = 0.0;
        for entry in entries {
            distribution.record(entry.mood);
            total_confidence += entry.confidence;
        }
        Self {
            total_entries: entries.len(),
            most_common_mood: distribution.most_common(),
            mood_distribution: distribution,
            average_confidence: total_confidence / entries.len() as f64,
        }
    }
}

/// Durable home for the full history map.
#[async_trait::async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Full persisted map; empty when nothing has been saved yet.
    async fn load(&self) -> MoodResult<UserHistory>;
    /// Replaces the persisted map with `history`.
    async fn save(&self, history: &UserHistory) -> MoodResult<()>;
}

/// Single JSON file, replaced atomically via a sibling temp file and rename.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_HISTORY_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "mood_history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl HistoryStorage for JsonFileStorage {
    async fn load(&self) -> MoodResult<UserHistory> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => Ok(UserHistory::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UserHistory::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, history: &UserHistory) -> MoodResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec(history)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-process storage: keeps the last saved snapshot. For tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: std::sync::Mutex<UserHistory>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: UserHistory) -> Self {
        Self {
            snapshot: std::sync::Mutex::new(history),
        }
    }

    pub fn snapshot(&self) -> UserHistory {
        self.snapshot
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl HistoryStorage for MemoryStorage {
    async fn load(&self) -> MoodResult<UserHistory> {
        Ok(self.snapshot())
    }

    async fn save(&self, history: &UserHistory) -> MoodResult<()> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| MoodError::Storage(e.to_string()))?;
        *guard = history.clone();
        Ok(())
    }
}

/// Per-user mood history shared by all request handlers.
pub struct HistoryStore {
    state: Mutex<UserHistory>,
    storage: Arc<dyn HistoryStorage>,
}

impl HistoryStore {
    /// Loads the full persisted map from `storage`.
    pub async fn open(storage: Arc<dyn HistoryStorage>) -> MoodResult<Self> {
        let state = storage.load().await?;
        tracing::info!(
            target: "moodlog::history",
            users = state.len(),
            entries = state.values().map(Vec::len).sum::<usize>(),
            "history loaded"
        );
        Ok(Self {
            state: Mutex::new(state),
            storage,
        })
    }

    /// Appends `entry` for `user_id` and persists the whole map.
    pub async fn append(&self, user_id: &str, entry: MoodLogEntry) -> MoodResult<()> {
        self.record(user_id, |_| (entry, ())).await
    }

    /// Builds an entry from the user's prior entries, appends it and persists, all
    /// under the store lock. If persisting fails the append is undone.
    pub async fn record<F, T>(&self, user_id: &str, build: F) -> MoodResult<T>
    where
        F: FnOnce(&[MoodLogEntry]) -> (MoodLogEntry, T) + Send,
        T: Send,
    {
        let mut state = self.state.lock().await;
        let (entry, out) = build(state.get(user_id).map(Vec::as_slice).unwrap_or(&[]));
        let created = !state.contains_key(user_id);
        state.entry(user_id.to_string()).or_default().push(entry);

        if let Err(e) = self.storage.save(&state).await {
            if created {
                state.remove(user_id);
            } else if let Some(entries) = state.get_mut(user_id) {
                entries.pop();
            }
            tracing::warn!(
                target: "moodlog::history",
                user_id,
                error = %e,
                "persist failed; append rolled back"
            );
            return Err(e);
        }
        Ok(out)
    }

    /// Entries for `user_id`, oldest first. With `limit = Some(k)` (k > 0) only the
    /// last `k` are returned; `Some(0)` is treated as no limit.
    pub async fn history(&self, user_id: &str, limit: Option<usize>) -> Vec<MoodLogEntry> {
        let state = self.state.lock().await;
        let Some(entries) = state.get(user_id) else {
            return Vec::new();
        };
        match limit {
            Some(k) if k > 0 && k < entries.len() => entries[entries.len() - k..].to_vec(),
            _ => entries.clone(),
        }
    }

    pub async fn stats(&self, user_id: &str) -> MoodStats {
        let state = self.state.lock().await;
        state
            .get(user_id)
            .map(|entries| MoodStats::from_entries(entries))
            .unwrap_or_else(MoodStats::empty)
    }

    /// Known user ids, sorted.
    pub async fn users(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut users: Vec<String> = state.keys().cloned().collect();
        users.sort();
        users
    }
}
