//! Game event endpoint

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use super::{client_info, ApiError, ApiResponse};
use crate::api::state::AppState;
use crate::ingest::GameEventReceipt;
use crate::types::GameEventPayload;

/// POST /api/game-events - Persist one game event immediately
pub async fn ingest_game_event(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<GameEventReceipt>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let event: GameEventPayload = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid game event: {}", e)))?;

    let client = client_info(&headers, peer.map(|ConnectInfo(addr)| addr));
    let receipt = state.controller.ingest_game_event(event, &client).await?;

    Ok(Json(ApiResponse::ok("Game event recorded", receipt)))
}
