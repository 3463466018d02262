//! Log ingestion endpoints

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::{client_info, ApiError, ApiResponse};
use crate::api::state::AppState;
use crate::ingest::BatchReceipt;
use crate::types::{LogBatch, RawLogEntry};

#[derive(Debug, Serialize)]
pub struct IngestedLog {
    pub id: String,
}

/// POST /api/logs - Buffer one log entry
pub async fn ingest_log(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<IngestedLog>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let entry: RawLogEntry = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid log entry: {}", e)))?;

    let client = client_info(&headers, peer.map(|ConnectInfo(addr)| addr));
    let id = state.controller.ingest_one(entry, &client)?;

    Ok(Json(ApiResponse::ok("Log entry accepted", IngestedLog { id })))
}

/// POST /api/logs/batch - Buffer a batch of log entries
pub async fn ingest_batch(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchReceipt>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let batch = LogBatch::from_value(body)?;

    let client = client_info(&headers, peer.map(|ConnectInfo(addr)| addr));
    let receipt = state.controller.ingest_batch(batch, &client)?;

    let message = format!("Batch of {} log entries accepted", receipt.count);
    Ok(Json(ApiResponse::ok(message, receipt)))
}
