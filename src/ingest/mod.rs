//! Ingestion engine: buffering and durable flush of telemetry
//!
//! - `LogBuffer`: ordered in-memory queue of enriched log entries
//! - `partition`: maps records to UTC date keys
//! - `RecordWriter` / `JsonlFileWriter`: append-only JSONL writes
//! - `FlushExecutor`: drain → partition → write → restore on failure
//! - `FlushScheduler`: periodic and threshold triggers
//! - `StatsCollector`: output directory statistics
//! - `LogController`: the operator-facing surface tying it together
//!
//! # Architecture
//!
//! ```text
//! ingest_one / ingest_batch
//!        │
//!        ▼
//! ┌─────────────┐  size ≥ max   ┌────────────────┐
//! │  LogBuffer  │──────────────►│ FlushScheduler │◄── every flush_interval
//! └─────────────┘   (Notify)    └───────┬────────┘
//!        ▲                              │        trigger_manual_flush
//!        │ restore on failure           ▼               │
//!        │                      ┌───────────────┐       │
//!        └──────────────────────│ FlushExecutor │◄──────┘
//!                               └───────┬───────┘
//!                                       ▼
//!                     frontend-logs-YYYY-MM-DD.jsonl
//!
//! ingest_game_event ───────────► game-events-YYYY-MM-DD.jsonl
//! ```

mod buffer;
mod config;
mod controller;
mod error;
mod flush;
mod partition;
mod scheduler;
mod stats;
mod writer;

#[cfg(test)]
pub(crate) mod test_utils;

pub use buffer::LogBuffer;
pub use config::{IngestConfig, FILE_EXTENSION, GAME_EVENT_FILE_PREFIX, LOG_FILE_PREFIX};
pub use controller::{BatchReceipt, ControllerStatus, GameEventReceipt, LogController, LogStats};
pub use error::{ErrorKind, IngestError, IngestResult};
pub use flush::{
    FlushCounters, FlushExecutor, FlushFailure, FlushOutcome, FlushReport, FlushState,
    FlushTrigger, PartitionWrite, SkipReason,
};
pub use partition::{partition_by_date, partition_key, Partition, Timestamped};
pub use scheduler::FlushScheduler;
pub use stats::{FileFamily, LogDirectoryStats, StatsCollector};
pub use writer::{encode_lines, read_records, JsonlFileWriter, RecordWriter};
