//! Moodlog Gateway: HTTP front for mood analysis and per-user history.
//! One HistoryStore per process, shared through axum state.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use moodlog_core::{
    HistoryStore, JsonFileStorage, MoodAnalysisResult, MoodAnalysisService, MoodConfig, MoodError,
    MoodLogEntry, MoodStats, ResponseGenerator,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
struct AppState {
    analysis: Arc<MoodAnalysisService>,
    history: Arc<HistoryStore>,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
    user_id: String,
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    limit: Option<usize>,
}

/// Any internal failure: `500 {"detail": ...}`.
struct ApiError(MoodError);

impl From<MoodError> for ApiError {
    fn from(err: MoodError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("[MOODLOG] request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": self.0.to_string() })),
        )
            .into_response()
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[moodlog-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("[MOODLOG] gateway stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = MoodConfig::load()?;
    tracing::info!(
        "[MOODLOG] classifier={:?} model={} history={}",
        config.classifier_mode,
        config.classifier_model,
        config.history_path
    );

    let storage = Arc::new(JsonFileStorage::new(&config.history_path));
    let history = Arc::new(HistoryStore::open(storage).await?);
    let analysis = Arc::new(MoodAnalysisService::new(
        config.build_classifier()?,
        ResponseGenerator::from_seed(config.reply_seed),
        Arc::clone(&history),
    ));

    let app = router(AppState { analysis, history });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[MOODLOG] listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("[MOODLOG] ctrl-c handler failed: {}", e);
    }
    tracing::info!("[MOODLOG] shutting down");
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze-mood", post(analyze_mood_handler))
        .route("/mood-history/:user_id", get(mood_history_handler))
        .route("/mood-stats/:user_id", get(mood_stats_handler))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::info!("[MOODLOG] {} {} -> {}", method, path, response.status());
    response
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": moodlog_core::version(),
        "users": state.history.users().await.len(),
    }))
}

/// POST /analyze-mood: classify, reply, log. The message text is never logged here.
async fn analyze_mood_handler(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<MoodAnalysisResult>, ApiError> {
    let result = state.analysis.analyze_mood(&body.text, &body.user_id).await?;
    Ok(Json(result))
}

/// GET /mood-history/:user_id?limit=N: oldest first; unknown users get `[]`.
async fn mood_history_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<MoodLogEntry>> {
    Json(state.history.history(&user_id, query.limit).await)
}

/// GET /mood-stats/:user_id: zero-value stats for unknown users.
async fn mood_stats_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<MoodStats> {
    Json(state.history.stats(&user_id).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodlog_core::{
        canned_replies, EmotionClassifier, EmotionScore, MemoryStorage, MoodCategory, MoodResult,
    };
    use tower::ServiceExt;

    /// Maps a few trigger words to fixed rankings.
    struct StubClassifier;

    #[async_trait::async_trait]
    impl EmotionClassifier for StubClassifier {
        async fn classify(&self, text: &str) -> MoodResult<Vec<EmotionScore>> {
            if text.contains("boom") {
                return Err(MoodError::Classifier("model unavailable".into()));
            }
            let top = if text.contains("happy") {
                ("joy", 0.9)
            } else if text.contains("sad") {
                ("sadness", 0.8)
            } else {
                ("neutral", 0.6)
            };
            Ok(vec![
                EmotionScore::new(top.0, top.1),
                EmotionScore::new("approval", 0.05),
                EmotionScore::new("realization", 0.02),
            ])
        }
    }

    async fn test_app() -> Router {
        let history = Arc::new(
            HistoryStore::open(Arc::new(MemoryStorage::new()))
                .await
                .unwrap(),
        );
        let analysis = Arc::new(MoodAnalysisService::new(
            Arc::new(StubClassifier),
            ResponseGenerator::from_seed(Some(42)),
            Arc::clone(&history),
        ));
        router(AppState { analysis, history })
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn analyze(text: &str, user_id: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze-mood")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "text": text, "user_id": user_id }).to_string(),
            ))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_mood_first_log() {
        let app = test_app().await;
        let (status, json) = send(&app, analyze("I am so happy today!", "u1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["mood"], "Happy");
        assert_eq!(json["emotion"], "joy");
        assert_eq!(json["confidence"], 0.9);
        let response = json["response"].as_str().unwrap();
        assert!(canned_replies(MoodCategory::Happy).contains(&response));
        assert_eq!(
            json["insight"],
            "This is your first mood log. Keep sharing how you feel to track your emotional journey!"
        );
        assert_eq!(json["all_emotions"].as_array().unwrap().len(), 3);
        assert_eq!(json["all_emotions"][0]["emotion"], "joy");
        assert_eq!(json["all_emotions"][0]["score"], 0.9);
    }

    #[tokio::test]
    async fn test_analyze_mood_classifier_failure_is_500() {
        let app = test_app().await;
        let (status, json) = send(&app, analyze("boom", "u1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["detail"].as_str().unwrap().contains("model unavailable"));

        let (_, history) = send(&app, get_req("/mood-history/u1")).await;
        assert_eq!(history, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_history_limit() {
        let app = test_app().await;
        for text in ["happy one", "sad two", "plain three"] {
            let (status, _) = send(&app, analyze(text, "u1")).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, all) = send(&app, get_req("/mood-history/u1")).await;
        assert_eq!(status, StatusCode::OK);
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["message"], "happy one");

        let (_, tail) = send(&app, get_req("/mood-history/u1?limit=2")).await;
        let tail = tail.as_array().unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0]["message"], "sad two");
        assert_eq!(tail[0]["mood"], "Sad");
        assert_eq!(tail[1]["message"], "plain three");
        assert!(tail[1]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_user_reads() {
        let app = test_app().await;
        let (status, history) = send(&app, get_req("/mood-history/ghost?limit=5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history, serde_json::json!([]));

        let (status, stats) = send(&app, get_req("/mood-stats/ghost")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_entries"], 0);
        assert_eq!(stats["mood_distribution"], serde_json::json!({}));
        assert!(stats["most_common_mood"].is_null());
        assert_eq!(stats["average_confidence"], 0.0);
    }

    #[tokio::test]
    async fn test_stats_after_analysis() {
        let app = test_app().await;
        send(&app, analyze("happy", "u2")).await;
        send(&app, analyze("sad", "u2")).await;
        send(&app, analyze("happy again", "u2")).await;

        let (status, stats) = send(&app, get_req("/mood-stats/u2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_entries"], 3);
        assert_eq!(stats["mood_distribution"]["Happy"], 2);
        assert_eq!(stats["mood_distribution"]["Sad"], 1);
        assert_eq!(stats["most_common_mood"], "Happy");
        let avg = stats["average_confidence"].as_f64().unwrap();
        assert!((avg - (0.9 + 0.8 + 0.9) / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        send(&app, analyze("happy", "u1")).await;
        let (status, json) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["users"], 1);
    }
}
