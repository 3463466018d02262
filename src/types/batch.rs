//! Batched log submissions

use serde::Deserialize;
use serde_json::Value;

use super::RawLogEntry;
use crate::ingest::{IngestError, IngestResult};

/// A batch of log entries sent by one client session
#[derive(Debug, Clone, PartialEq)]
pub struct LogBatch {
    pub logs: Vec<RawLogEntry>,
    pub session_id: String,
    pub timestamp: Option<String>,
    pub version: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchEnvelope {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl LogBatch {
    /// Validate the shape of a batch body
    ///
    /// `logs` must be an array and every element a valid log entry. An empty
    /// array is a valid (if pointless) batch. `sessionId` and `version` are
    /// required; the batch `timestamp` is optional and only carried along.
    pub fn from_value(value: Value) -> IngestResult<Self> {
        let Value::Object(mut body) = value else {
            return Err(IngestError::Validation(
                "batch body must be a JSON object".to_string(),
            ));
        };

        let logs = match body.remove("logs") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(IngestError::Validation("logs must be an array".to_string()));
            }
            None => return Err(IngestError::Validation("logs is required".to_string())),
        };

        let envelope: BatchEnvelope = serde_json::from_value(Value::Object(body))
            .map_err(|e| IngestError::Validation(format!("invalid batch envelope: {}", e)))?;

        let logs = logs
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<RawLogEntry>(item).map_err(|e| {
                    IngestError::Validation(format!("invalid log entry at index {}: {}", index, e))
                })
            })
            .collect::<IngestResult<Vec<_>>>()?;

        Ok(Self {
            logs,
            session_id: required(envelope.session_id, "sessionId")?,
            timestamp: envelope.timestamp,
            version: required(envelope.version, "version")?,
        })
    }
}

fn required(value: Option<String>, field: &str) -> IngestResult<String> {
    value.ok_or_else(|| IngestError::Validation(format!("{} is required", field)))
}
