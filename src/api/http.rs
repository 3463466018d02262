//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use super::rest::{game_events, logs, status};
use super::state::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // Clients are browsers and game builds served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Ingestion
        .route("/api/logs", post(logs::ingest_log))
        .route("/api/logs/batch", post(logs::ingest_batch))
        .route("/api/game-events", post(game_events::ingest_game_event))
        // Operator surface
        .route("/api/logs/stats", get(status::get_stats))
        .route("/api/logs/status", get(status::get_status))
        .route("/api/logs/flush", post(status::trigger_flush))
        .route("/api/logs/buffer", delete(status::clear_buffer))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let now = crate::utils::current_timestamp();
    Json(json!({
        "status": "ok",
        "initialized": state.controller.is_initialized(),
        "uptimeSeconds": (now - state.started_at).max(0),
        "version": crate::VERSION,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{IngestConfig, LogController};
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let temp_dir = TempDir::new().unwrap();
        let controller = Arc::new(LogController::new(IngestConfig::new(temp_dir.path())));
        let state = Arc::new(AppState::new(controller));
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }
}
