//! Log controller - the operator-facing surface of the ingestion engine
//!
//! Owns the buffer, the flush executor and the scheduler task. Nothing here
//! is global: each controller is an isolated instance with its own
//! configuration and lifecycle (`init` → `start` → `stop`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use super::buffer::LogBuffer;
use super::config::IngestConfig;
use super::error::{IngestError, IngestResult};
use super::flush::{
    FlushCounters, FlushExecutor, FlushFailure, FlushOutcome, FlushReport, FlushState,
    FlushTrigger,
};
use super::partition::partition_key;
use super::scheduler::FlushScheduler;
use super::stats::{LogDirectoryStats, StatsCollector};
use super::writer::{encode_lines, JsonlFileWriter, RecordWriter};
use crate::types::{
    BatchContext, ClientInfo, EnrichedLogEntry, GameEventPayload, GameEventRecord, LogBatch,
    RawLogEntry,
};

/// Receipt for an accepted batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReceipt {
    pub batch_id: String,
    pub count: usize,
    pub ids: Vec<String>,
}

/// Receipt for a persisted game event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEventReceipt {
    pub id: String,
    pub file: String,
}

/// Buffer figures plus a fresh directory scan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub buffer_size: usize,
    pub is_processing: bool,
    #[serde(flatten)]
    pub files: LogDirectoryStats,
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStatus {
    pub initialized: bool,
    pub is_processing: bool,
    pub flush_state: FlushState,
    pub buffer_size: usize,
    pub max_buffer_size: usize,
    pub flush_interval_ms: u64,
    pub log_directory: String,
    pub scheduler_running: bool,
    pub counters: FlushCounters,
    pub last_flush: Option<FlushReport>,
    pub last_failure: Option<FlushFailure>,
}

/// Buffers log entries and persists them to date-partitioned files
pub struct LogController {
    config: IngestConfig,
    buffer: Arc<LogBuffer>,
    executor: Arc<FlushExecutor>,
    writer: Arc<dyn RecordWriter>,
    initialized: AtomicBool,
    threshold_signal: Arc<Notify>,
    scheduler: parking_lot::Mutex<Option<FlushScheduler>>,
}

impl LogController {
    /// Create a controller writing to the local filesystem
    pub fn new(config: IngestConfig) -> Self {
        Self::with_writer(config, Arc::new(JsonlFileWriter::new()))
    }

    /// Create a controller with a custom writer
    pub fn with_writer(config: IngestConfig, writer: Arc<dyn RecordWriter>) -> Self {
        let buffer = Arc::new(LogBuffer::new());
        let executor = Arc::new(FlushExecutor::new(
            config.clone(),
            buffer.clone(),
            writer.clone(),
        ));

        Self {
            config,
            buffer,
            executor,
            writer,
            initialized: AtomicBool::new(false),
            threshold_signal: Arc::new(Notify::new()),
            scheduler: parking_lot::Mutex::new(None),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn executor(&self) -> &Arc<FlushExecutor> {
        &self.executor
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    fn ensure_initialized(&self) -> IngestResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(IngestError::NotInitialized)
        }
    }

    /// Create the output directory. Ingestion is refused until this succeeds.
    pub async fn init(&self) -> IngestResult<()> {
        tokio::fs::create_dir_all(self.config.log_dir()).await?;
        self.initialized.store(true, Ordering::SeqCst);
        info!(directory = %self.config.log_dir().display(), "log controller initialized");
        Ok(())
    }

    /// Start the periodic flush task. Starting twice is a no-op.
    pub fn start(&self) -> IngestResult<()> {
        self.ensure_initialized()?;

        let mut scheduler = self.scheduler.lock();
        if scheduler.as_ref().is_some_and(FlushScheduler::is_running) {
            return Ok(());
        }
        *scheduler = Some(FlushScheduler::spawn(
            self.executor.clone(),
            self.config.flush_interval,
            self.threshold_signal.clone(),
        ));
        Ok(())
    }

    /// Stop the flush task, then write out whatever is still buffered
    pub async fn stop(&self) -> IngestResult<FlushOutcome> {
        let scheduler = self.scheduler.lock().take();
        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await;
        }

        self.ensure_initialized()?;
        let outcome = self.run_flush(FlushTrigger::Shutdown).await?;
        info!(
            entries = outcome.entries_written(),
            remaining = self.buffer.len(),
            "log controller stopped"
        );
        Ok(outcome)
    }

    fn push(&self, entry: EnrichedLogEntry) -> String {
        let (id, size) = self.buffer.append(entry);
        self.signal_if_full(size);
        id
    }

    fn signal_if_full(&self, size: usize) {
        if size >= self.config.max_buffer_size {
            debug!(size, threshold = self.config.max_buffer_size, "buffer threshold reached");
            self.threshold_signal.notify_one();
        }
    }

    /// Accept one log entry for eventual persistence, returning its id
    pub fn ingest_one(&self, entry: RawLogEntry, client: &ClientInfo) -> IngestResult<String> {
        self.ensure_initialized()?;
        let enriched = EnrichedLogEntry::enrich(entry, client, None, Utc::now());
        Ok(self.push(enriched))
    }

    /// Accept a validated batch; all its entries share one batch id
    pub fn ingest_batch(&self, batch: LogBatch, client: &ClientInfo) -> IngestResult<BatchReceipt> {
        self.ensure_initialized()?;

        let context = BatchContext {
            batch_id: uuid::Uuid::new_v4().to_string(),
            session_id: batch.session_id,
            batch_version: batch.version,
        };
        let received_at = Utc::now();
        let entries: Vec<EnrichedLogEntry> = batch
            .logs
            .into_iter()
            .map(|entry| EnrichedLogEntry::enrich(entry, client, Some(&context), received_at))
            .collect();
        let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();

        if !entries.is_empty() {
            let size = self.buffer.extend(entries);
            self.signal_if_full(size);
        }

        debug!(batch_id = %context.batch_id, session_id = %context.session_id, count = ids.len(), "batch buffered");
        Ok(BatchReceipt {
            batch_id: context.batch_id,
            count: ids.len(),
            ids,
        })
    }

    /// Write one game event straight to its partition file
    pub async fn ingest_game_event(
        &self,
        event: GameEventPayload,
        client: &ClientInfo,
    ) -> IngestResult<GameEventReceipt> {
        self.ensure_initialized()?;

        let now = Utc::now();
        let record = GameEventRecord::enrich(event, client, now);
        let path = self
            .config
            .game_event_file_path(partition_key(&record, now));
        let body = encode_lines(std::slice::from_ref(&record))?;

        if let Err(source) = self.writer.append(&path, &body).await {
            error!(file = %path.display(), event = %record.event.event_name, error = %source, "failed to write game event");
            return Err(IngestError::Persistence {
                path,
                restored: 0,
                source,
            });
        }

        Ok(GameEventReceipt {
            id: record.id,
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
    }

    /// Buffer figures and a fresh scan of the output directory
    pub fn get_stats(&self) -> IngestResult<LogStats> {
        self.ensure_initialized()?;
        let files = StatsCollector::new(self.config.log_dir()).collect()?;
        Ok(LogStats {
            buffer_size: self.buffer.len(),
            is_processing: self.executor.is_processing(),
            files,
        })
    }

    /// Flush now; a no-op if a flush is already running
    pub async fn trigger_manual_flush(&self) -> IngestResult<FlushOutcome> {
        self.ensure_initialized()?;
        self.run_flush(FlushTrigger::Manual).await
    }

    // Runs on its own task so a dropped caller cannot abandon a drained snapshot
    async fn run_flush(&self, trigger: FlushTrigger) -> IngestResult<FlushOutcome> {
        let executor = self.executor.clone();
        tokio::spawn(async move { executor.flush(trigger).await })
            .await
            .map_err(|e| IngestError::Internal(format!("flush task failed: {}", e)))?
    }

    /// Discard everything buffered, returning how many entries were dropped
    pub fn clear_buffer(&self) -> usize {
        let cleared = self.buffer.clear();
        info!(cleared, "log buffer cleared");
        cleared
    }

    pub fn get_status(&self) -> ControllerStatus {
        let scheduler_running = self
            .scheduler
            .lock()
            .as_ref()
            .is_some_and(FlushScheduler::is_running);

        ControllerStatus {
            initialized: self.is_initialized(),
            is_processing: self.executor.is_processing(),
            flush_state: self.executor.state(),
            buffer_size: self.buffer.len(),
            max_buffer_size: self.config.max_buffer_size,
            flush_interval_ms: self.config.flush_interval.as_millis() as u64,
            log_directory: self.config.log_dir().display().to_string(),
            scheduler_running,
            counters: self.executor.counters(),
            last_flush: self.executor.last_report(),
            last_failure: self.executor.last_failure(),
        }
    }
}
