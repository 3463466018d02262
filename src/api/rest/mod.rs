//! REST API module for HTTP endpoints
//!
//! - `POST /api/logs` - Ingest one log entry
//! - `POST /api/logs/batch` - Ingest a batch of log entries
//! - `POST /api/game-events` - Persist one game event
//! - `GET /api/logs/stats` - Buffer and output directory statistics
//! - `GET /api/logs/status` - Controller status
//! - `POST /api/logs/flush` - Manual flush
//! - `DELETE /api/logs/buffer` - Discard buffered entries

pub mod game_events;
pub mod logs;
pub mod status;

use std::net::SocketAddr;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::ingest::{ErrorKind, IngestError};
use crate::types::ClientInfo;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub message: String,
    pub code: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            message: message.into(),
            code: code.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn not_initialized() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "NOT_INITIALIZED",
            "Log controller is not initialized",
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err.kind() {
            ErrorKind::NotInitialized => ApiError::not_initialized(),
            ErrorKind::Validation => ApiError::bad_request(err.to_string()),
            ErrorKind::Persistence => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR", err.to_string())
            }
            ErrorKind::Internal => {
                error!(error = %err, "request failed");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Origin of a request: first `X-Forwarded-For` hop, then the peer address
pub fn client_info(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientInfo {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    let ip = forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    ClientInfo::new(ip, user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_info_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.5, 10.0.0.1"));
        headers.insert("user-agent", HeaderValue::from_static("GameClient/1.0"));

        let info = client_info(&headers, Some("127.0.0.1:5000".parse().unwrap()));

        assert_eq!(info.ip, "203.0.113.5");
        assert_eq!(info.user_agent, "GameClient/1.0");
    }

    #[test]
    fn test_client_info_falls_back() {
        let info = client_info(&HeaderMap::new(), Some("127.0.0.1:5000".parse().unwrap()));
        assert_eq!(info.ip, "127.0.0.1");
        assert_eq!(info.user_agent, "unknown");

        assert_eq!(client_info(&HeaderMap::new(), None).ip, "unknown");
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ApiError::from(IngestError::NotInitialized).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(IngestError::Validation("x".to_string())).status,
            StatusCode::BAD_REQUEST
        );
        let internal = ApiError::from(IngestError::Internal("secret detail".to_string()));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.message.contains("secret"));
    }
}
