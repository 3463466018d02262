//! Operator endpoints: stats, status, manual flush, buffer reset

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use super::{ApiError, ApiResponse};
use crate::api::state::AppState;
use crate::ingest::{ControllerStatus, FlushOutcome, LogStats, SkipReason};

/// GET /api/logs/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<LogStats>>, ApiError> {
    let stats = state.controller.get_stats()?;
    Ok(Json(ApiResponse::ok("Log statistics", stats)))
}

/// GET /api/logs/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ControllerStatus>> {
    Json(ApiResponse::ok("Log controller status", state.controller.get_status()))
}

/// POST /api/logs/flush
pub async fn trigger_flush(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FlushOutcome>>, ApiError> {
    let outcome = state.controller.trigger_manual_flush().await?;
    let message = match &outcome {
        FlushOutcome::Flushed(report) => format!("Flushed {} log entries", report.entries_written),
        FlushOutcome::Skipped {
            reason: SkipReason::Empty,
        } => "Buffer is empty, nothing to flush".to_string(),
        FlushOutcome::Skipped {
            reason: SkipReason::InProgress,
        } => "Flush already in progress".to_string(),
    };
    Ok(Json(ApiResponse::ok(message, outcome)))
}

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub cleared: usize,
}

/// DELETE /api/logs/buffer
pub async fn clear_buffer(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Cleared>> {
    let cleared = state.controller.clear_buffer();
    Json(ApiResponse::ok(
        format!("Cleared {} buffered log entries", cleared),
        Cleared { cleared },
    ))
}
