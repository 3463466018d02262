//! Telemetry Ingest Server
//!
//! Accepts structured log entries and game events from remote clients,
//! buffers log entries in memory and persists everything to append-only,
//! date-partitioned JSONL files.
//!
//! # Features
//!
//! - **Never blocks ingestion**: the buffer absorbs slow or failing disks
//! - **Single flush in flight**: periodic, threshold and manual triggers share one gate
//! - **No silent loss**: failed partitions are restored to the front of the buffer
//! - **Date partitioning**: `frontend-logs-YYYY-MM-DD.jsonl`, `game-events-YYYY-MM-DD.jsonl`
//!
//! # Modules
//!
//! - `types`: Client payloads and enriched records
//! - `ingest`: Buffer, partitioner, writer, flush executor, scheduler, controller
//! - `api`: HTTP endpoints (axum)
//! - `config`: Environment-driven server configuration
//! - `utils`: Timestamp helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use telemetry_ingest::{ClientInfo, IngestConfig, LogController, LogLevel, RawLogEntry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = Arc::new(LogController::new(IngestConfig::new("logs")));
//!     controller.init().await?;
//!     controller.start()?;
//!
//!     let entry = RawLogEntry::new(LogLevel::Info, "Menu", "opened");
//!     controller.ingest_one(entry, &ClientInfo::unknown())?;
//!
//!     controller.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod ingest;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{ConfigError, ServerConfig};
pub use ingest::{
    FlushOutcome, IngestConfig, IngestError, IngestResult, LogController, RecordWriter,
};
pub use types::{
    ClientInfo, EnrichedLogEntry, GameEventPayload, GameEventRecord, LogBatch, LogLevel,
    RawLogEntry, ServerResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
