//! Data types for the telemetry ingestion server
//!
//! Client payloads and the enriched records written to disk.

mod batch;
mod client;
mod game_event;
mod log_entry;

pub use batch::LogBatch;
pub use client::ClientInfo;
pub use game_event::{GameEventPayload, GameEventRecord, GAME_EVENT_SOURCE};
pub use log_entry::{
    BatchContext, EnrichedLogEntry, LogLevel, RawLogEntry, LOG_SOURCE, RESERVED_FIELDS,
};

/// Result type for process-level plumbing (startup, shutdown)
pub type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
