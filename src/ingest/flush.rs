//! Flush executor
//!
//! Moves buffered entries to their date partitions:
//!
//! ```text
//! Idle ──► Draining ──► Writing ──► Idle
//!                          │
//!                          └─ write error ──► Restoring ──► Idle
//! ```
//!
//! Only one flush runs at a time. A trigger that finds the gate taken is a
//! no-op; whatever it would have written is picked up by the next cycle.
//! Partitions written before a failure stay written (at-least-once), the
//! failed partition and everything after it go back to the front of the
//! buffer.

use std::io;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info};

use super::buffer::LogBuffer;
use super::config::IngestConfig;
use super::error::{IngestError, IngestResult};
use super::partition::partition_by_date;
use super::writer::{encode_lines, RecordWriter};
use crate::utils::format_timestamp;

/// Where the executor currently is in a flush cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushState {
    Idle,
    Draining,
    Writing,
    Restoring,
}

/// What asked for a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushTrigger {
    Periodic,
    Threshold,
    Manual,
    Shutdown,
}

impl std::fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlushTrigger::Periodic => write!(f, "periodic"),
            FlushTrigger::Threshold => write!(f, "threshold"),
            FlushTrigger::Manual => write!(f, "manual"),
            FlushTrigger::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Why a trigger did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InProgress,
    Empty,
}

/// One partition file written during a flush
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionWrite {
    pub file: String,
    pub entries: usize,
}

/// Summary of a successful flush
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    pub trigger: FlushTrigger,
    pub entries_written: usize,
    pub partitions: Vec<PartitionWrite>,
    pub completed_at: String,
}

/// Details of the most recent failed flush
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushFailure {
    pub trigger: FlushTrigger,
    pub file: String,
    pub entries_written: usize,
    pub entries_restored: usize,
    pub error: String,
    pub failed_at: String,
}

/// Result of a flush trigger that did not fail
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlushOutcome {
    Flushed(FlushReport),
    Skipped { reason: SkipReason },
}

impl FlushOutcome {
    pub fn entries_written(&self) -> usize {
        match self {
            FlushOutcome::Flushed(report) => report.entries_written,
            FlushOutcome::Skipped { .. } => 0,
        }
    }
}

/// Lifetime counters for the executor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushCounters {
    /// Flushes that drained a non-empty buffer
    pub runs: u64,
    pub successes: u64,
    pub failures: u64,
    /// Triggers ignored because a flush was running
    pub skipped_in_progress: u64,
    pub entries_written: u64,
    pub entries_restored: u64,
}

/// Resets the observable state when a flush ends, however it ends
struct IdleOnDrop<'a>(&'a Mutex<FlushState>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.lock() = FlushState::Idle;
    }
}

/// Drains the buffer into date-partitioned files
pub struct FlushExecutor {
    config: IngestConfig,
    buffer: Arc<LogBuffer>,
    writer: Arc<dyn RecordWriter>,
    gate: tokio::sync::Mutex<()>,
    state: Mutex<FlushState>,
    counters: Mutex<FlushCounters>,
    last_report: Mutex<Option<FlushReport>>,
    last_failure: Mutex<Option<FlushFailure>>,
}

impl FlushExecutor {
    pub fn new(config: IngestConfig, buffer: Arc<LogBuffer>, writer: Arc<dyn RecordWriter>) -> Self {
        Self {
            config,
            buffer,
            writer,
            gate: tokio::sync::Mutex::new(()),
            state: Mutex::new(FlushState::Idle),
            counters: Mutex::new(FlushCounters::default()),
            last_report: Mutex::new(None),
            last_failure: Mutex::new(None),
        }
    }

    pub fn state(&self) -> FlushState {
        *self.state.lock()
    }

    pub fn is_processing(&self) -> bool {
        self.state() != FlushState::Idle
    }

    pub fn counters(&self) -> FlushCounters {
        self.counters.lock().clone()
    }

    pub fn last_report(&self) -> Option<FlushReport> {
        self.last_report.lock().clone()
    }

    pub fn last_failure(&self) -> Option<FlushFailure> {
        self.last_failure.lock().clone()
    }

    fn set_state(&self, state: FlushState) {
        *self.state.lock() = state;
    }

    /// Run one flush cycle
    ///
    /// Returns `Skipped` when another flush holds the gate or there is nothing
    /// to write. A `Shutdown` trigger waits for the running flush instead, so
    /// entries buffered behind it still get written. A write failure restores
    /// the unwritten entries and returns `IngestError::Persistence`.
    pub async fn flush(&self, trigger: FlushTrigger) -> IngestResult<FlushOutcome> {
        let _gate = match self.gate.try_lock() {
            Ok(gate) => gate,
            Err(_) if trigger == FlushTrigger::Shutdown => {
                debug!(%trigger, "waiting for in-flight flush");
                self.gate.lock().await
            }
            Err(_) => {
                self.counters.lock().skipped_in_progress += 1;
                debug!(%trigger, "flush already in progress, trigger ignored");
                return Ok(FlushOutcome::Skipped {
                    reason: SkipReason::InProgress,
                });
            }
        };

        if self.buffer.is_empty() {
            return Ok(FlushOutcome::Skipped {
                reason: SkipReason::Empty,
            });
        }

        let _idle = IdleOnDrop(&self.state);
        self.set_state(FlushState::Draining);
        let snapshot = self.buffer.drain();
        if snapshot.is_empty() {
            // cleared between the check and the drain
            return Ok(FlushOutcome::Skipped {
                reason: SkipReason::Empty,
            });
        }

        self.counters.lock().runs += 1;
        self.set_state(FlushState::Writing);

        let total = snapshot.len();
        let mut partitions = partition_by_date(snapshot, Utc::now()).into_iter();
        let mut written = Vec::new();
        let mut entries_written = 0;

        while let Some(partition) = partitions.next() {
            let path = self.config.log_file_path(partition.date);
            let result = match encode_lines(&partition.records) {
                Ok(body) => self.writer.append(&path, &body).await,
                Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            };

            match result {
                Ok(()) => {
                    debug!(file = %path.display(), entries = partition.records.len(), "partition written");
                    entries_written += partition.records.len();
                    written.push(PartitionWrite {
                        file: file_name(&path),
                        entries: partition.records.len(),
                    });
                }
                Err(source) => {
                    self.set_state(FlushState::Restoring);

                    let mut remainder = partition.records;
                    for rest in partitions.by_ref() {
                        remainder.extend(rest.records);
                    }
                    let restored = remainder.len();
                    self.buffer.restore(remainder);

                    error!(
                        %trigger,
                        file = %path.display(),
                        written = entries_written,
                        restored,
                        error = %source,
                        "flush failed, unwritten entries restored to buffer"
                    );

                    {
                        let mut counters = self.counters.lock();
                        counters.failures += 1;
                        counters.entries_written += entries_written as u64;
                        counters.entries_restored += restored as u64;
                    }
                    *self.last_failure.lock() = Some(FlushFailure {
                        trigger,
                        file: file_name(&path),
                        entries_written,
                        entries_restored: restored,
                        error: source.to_string(),
                        failed_at: format_timestamp(Utc::now()),
                    });

                    return Err(IngestError::Persistence {
                        path,
                        restored,
                        source,
                    });
                }
            }
        }

        {
            let mut counters = self.counters.lock();
            counters.successes += 1;
            counters.entries_written += total as u64;
        }

        let report = FlushReport {
            trigger,
            entries_written: total,
            partitions: written,
            completed_at: format_timestamp(Utc::now()),
        };
        info!(
            %trigger,
            entries = total,
            files = report.partitions.len(),
            "flushed log buffer"
        );
        *self.last_report.lock() = Some(report.clone());

        Ok(FlushOutcome::Flushed(report))
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
