//! Request origin metadata

use serde::{Deserialize, Serialize};

/// Network origin of an ingestion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn new(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Placeholder used when the transport gives us nothing
    pub fn unknown() -> Self {
        Self::new("unknown", "unknown")
    }
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self::unknown()
    }
}
