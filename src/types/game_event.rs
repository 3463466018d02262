//! Game event types
//!
//! Game events skip the buffer and are written as soon as they arrive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ClientInfo;
use crate::utils::time::{format_timestamp, resolve_client_timestamp};

/// Source tag written on every game event record
pub const GAME_EVENT_SOURCE: &str = "game";

/// A game event as submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEventPayload {
    pub event_name: String,
    pub event_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<Value>,
}

impl GameEventPayload {
    pub fn new(event_name: impl Into<String>, event_data: Map<String, Value>) -> Self {
        Self {
            event_name: event_name.into(),
            event_data,
            player_id: None,
            timestamp: None,
            game_state: None,
        }
    }
}

/// A game event after server enrichment, as written to `game-events-*.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEventRecord {
    pub id: String,

    #[serde(flatten)]
    pub event: GameEventPayload,

    pub received_at: String,
    pub timestamp: String,
    pub source: String,
    pub ip: String,
    pub user_agent: String,
}

impl GameEventRecord {
    pub fn enrich(mut event: GameEventPayload, client: &ClientInfo, received_at: DateTime<Utc>) -> Self {
        let received_at = format_timestamp(received_at);
        let timestamp =
            resolve_client_timestamp(event.timestamp.take().as_ref(), &received_at, GAME_EVENT_SOURCE);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event,
            received_at,
            timestamp,
            source: GAME_EVENT_SOURCE.to_string(),
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::test_utils::capture_logs;
    use serde_json::json;

    #[test]
    fn test_event_data_must_be_object() {
        let result: Result<GameEventPayload, _> = serde_json::from_value(json!({
            "eventName": "level_up",
            "eventData": [1, 2, 3]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_enrich_game_event() {
        let payload: GameEventPayload = serde_json::from_value(json!({
            "eventName": "level_up",
            "eventData": {"level": 7},
            "playerId": "p-1",
            "timestamp": "2024-01-16T08:00:00+02:00",
            "gameState": {"hp": 10}
        }))
        .unwrap();

        let record = GameEventRecord::enrich(payload, &ClientInfo::new("1.2.3.4", "ua"), Utc::now());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["source"], json!("game"));
        assert_eq!(value["eventData"]["level"], json!(7));
        assert_eq!(value["playerId"], json!("p-1"));
        assert_eq!(record.timestamp, "2024-01-16T06:00:00.000Z");
    }

    #[test]
    fn test_unparsable_event_timestamp_warns() {
        let mut payload = GameEventPayload::new("boss_defeated", Map::new());
        payload.timestamp = Some(json!("tomorrow-ish"));

        let (record, logs) =
            capture_logs(|| GameEventRecord::enrich(payload, &ClientInfo::unknown(), Utc::now()));

        assert_eq!(record.timestamp, record.received_at);
        assert!(logs.contains("WARN"), "captured: {}", logs);
        assert!(logs.contains("unparsable client timestamp"));
        assert!(logs.contains("game"));
    }
}
