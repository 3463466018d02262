//! Log entry types
//!
//! `RawLogEntry` is what a client submits; `EnrichedLogEntry` is what the
//! buffer holds and what lands in `frontend-logs-*.jsonl`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ClientInfo;
use crate::utils::time::{format_timestamp, resolve_client_timestamp};
use chrono::{DateTime, Utc};

/// Source tag written on every log entry record
pub const LOG_SOURCE: &str = "frontend";

/// Keys assigned by the server. Client extras with these names are dropped.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "receivedAt",
    "timestamp",
    "source",
    "ip",
    "userAgent",
    "batchId",
    "sessionId",
    "batchVersion",
];

/// Severity of a client log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Trace => write!(f, "TRACE"),
        }
    }
}

/// A log entry as submitted by a client
///
/// The schema is open: unknown fields are kept in `extra` and written back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogEntry {
    pub level: LogLevel,
    pub object_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Value>,
    /// Client event time. Replaced by a normalized value on enrichment.
    #[serde(default, skip_serializing)]
    pub timestamp: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawLogEntry {
    /// Minimal entry, mostly useful for tests and internal producers
    pub fn new(level: LogLevel, object_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            object_name: object_name.into(),
            message: message.into(),
            data: None,
            method_name: None,
            stack_trace: None,
            performance: None,
            timestamp: None,
            extra: Map::new(),
        }
    }

    /// Set the client timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(Value::String(timestamp.into()));
        self
    }
}

/// Batch membership attached to entries ingested through a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchContext {
    pub batch_id: String,
    pub session_id: String,
    pub batch_version: String,
}

/// A log entry after the server has stamped it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedLogEntry {
    /// Unique id assigned at ingestion
    pub id: String,

    #[serde(flatten)]
    pub entry: RawLogEntry,

    /// Server clock at ingestion (RFC 3339, UTC)
    pub received_at: String,

    /// Client event time when valid, otherwise `received_at`
    pub timestamp: String,

    pub source: String,
    pub ip: String,
    pub user_agent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_version: Option<String>,
}

impl EnrichedLogEntry {
    /// Stamp a raw entry with server metadata
    pub fn enrich(
        mut entry: RawLogEntry,
        client: &ClientInfo,
        batch: Option<&BatchContext>,
        received_at: DateTime<Utc>,
    ) -> Self {
        let received_at = format_timestamp(received_at);
        let timestamp = resolve_client_timestamp(entry.timestamp.take().as_ref(), &received_at, LOG_SOURCE);

        entry
            .extra
            .retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entry,
            received_at,
            timestamp,
            source: LOG_SOURCE.to_string(),
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            batch_id: batch.map(|b| b.batch_id.clone()),
            session_id: batch.map(|b| b.session_id.clone()),
            batch_version: batch.map(|b| b.batch_version.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::test_utils::capture_logs;
    use chrono::TimeZone;
    use serde_json::json;

    fn client() -> ClientInfo {
        ClientInfo::new("10.0.0.1", "test-agent")
    }

    #[test]
    fn test_deserialize_open_schema() {
        let entry: RawLogEntry = serde_json::from_value(json!({
            "level": "WARN",
            "objectName": "Player",
            "message": "low health",
            "methodName": "update",
            "route": "/arena"
        }))
        .unwrap();

        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.method_name.as_deref(), Some("update"));
        assert_eq!(entry.extra.get("route"), Some(&json!("/arena")));
    }

    #[test]
    fn test_rejects_unknown_level() {
        let result: Result<RawLogEntry, _> = serde_json::from_value(json!({
            "level": "FATAL",
            "objectName": "X",
            "message": "m"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_enrich_keeps_valid_client_timestamp() {
        let raw = RawLogEntry::new(LogLevel::Info, "Menu", "opened")
            .with_timestamp("2024-01-15T10:00:00Z");
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let enriched = EnrichedLogEntry::enrich(raw, &client(), None, now);

        assert_eq!(enriched.timestamp, "2024-01-15T10:00:00.000Z");
        assert_eq!(enriched.received_at, "2024-03-01T00:00:00.000Z");
        assert_eq!(enriched.source, "frontend");
        assert_eq!(enriched.ip, "10.0.0.1");
        assert!(enriched.batch_id.is_none());
    }

    #[test]
    fn test_enrich_invalid_timestamp_falls_back_to_received_at() {
        let raw = RawLogEntry::new(LogLevel::Info, "Menu", "opened").with_timestamp("yesterday");
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        let enriched = EnrichedLogEntry::enrich(raw, &client(), None, now);

        assert_eq!(enriched.timestamp, enriched.received_at);
    }

    #[test]
    fn test_enrich_drops_reserved_extras() {
        let raw: RawLogEntry = serde_json::from_value(json!({
            "level": "INFO",
            "objectName": "X",
            "message": "m",
            "id": "client-chosen",
            "source": "spoofed",
            "scene": "lobby"
        }))
        .unwrap();

        let enriched = EnrichedLogEntry::enrich(raw, &client(), None, Utc::now());
        let value = serde_json::to_value(&enriched).unwrap();

        assert_ne!(value["id"], json!("client-chosen"));
        assert_eq!(value["source"], json!("frontend"));
        assert_eq!(value["scene"], json!("lobby"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = EnrichedLogEntry::enrich(
            RawLogEntry::new(LogLevel::Info, "A", "a"),
            &client(),
            None,
            Utc::now(),
        );
        let b = EnrichedLogEntry::enrich(
            RawLogEntry::new(LogLevel::Info, "A", "a"),
            &client(),
            None,
            Utc::now(),
        );
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_batch_fields_serialized() {
        let batch = BatchContext {
            batch_id: "b-1".to_string(),
            session_id: "s-1".to_string(),
            batch_version: "1.2.0".to_string(),
        };
        let enriched = EnrichedLogEntry::enrich(
            RawLogEntry::new(LogLevel::Debug, "Net", "ping"),
            &client(),
            Some(&batch),
            Utc::now(),
        );
        let value = serde_json::to_value(&enriched).unwrap();

        assert_eq!(value["batchId"], json!("b-1"));
        assert_eq!(value["sessionId"], json!("s-1"));
        assert_eq!(value["batchVersion"], json!("1.2.0"));
        assert_eq!(value["level"], json!("DEBUG"));
    }

    #[test]
    fn test_enrich_warns_on_unusable_timestamp() {
        let (entry, logs) = capture_logs(|| {
            EnrichedLogEntry::enrich(
                RawLogEntry::new(LogLevel::Info, "Clock", "tick").with_timestamp("yesterday"),
                &client(),
                None,
                Utc::now(),
            )
        });

        assert_eq!(entry.timestamp, entry.received_at);
        assert!(logs.contains("WARN"), "captured: {}", logs);
        assert!(logs.contains("unparsable client timestamp"));
        assert!(logs.contains("yesterday"));
        assert!(logs.contains("frontend"));
    }

    #[test]
    fn test_enrich_warns_on_missing_timestamp() {
        let (_, logs) = capture_logs(|| {
            EnrichedLogEntry::enrich(
                RawLogEntry::new(LogLevel::Info, "Clock", "tick"),
                &client(),
                None,
                Utc::now(),
            )
        });
        assert!(logs.contains("missing client timestamp"), "captured: {}", logs);
    }

    #[test]
    fn test_enrich_valid_timestamp_is_quiet() {
        let (_, logs) = capture_logs(|| {
            EnrichedLogEntry::enrich(
                RawLogEntry::new(LogLevel::Info, "Clock", "tick").with_timestamp("2024-01-15T10:00:00Z"),
                &client(),
                None,
                Utc::now(),
            )
        });
        assert!(!logs.contains("WARN"), "captured: {}", logs);
    }
}
