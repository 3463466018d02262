//! Ingestion configuration and output file naming

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;

use crate::utils::date_key;

/// File name prefix for buffered log entries
pub const LOG_FILE_PREFIX: &str = "frontend-logs-";
/// File name prefix for game events
pub const GAME_EVENT_FILE_PREFIX: &str = "game-events-";
/// Extension shared by both streams
pub const FILE_EXTENSION: &str = ".jsonl";

/// Configuration for the ingestion controller
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Directory holding the partitioned output files
    pub log_dir: PathBuf,
    /// Buffer size that triggers a flush (never a rejection)
    pub max_buffer_size: usize,
    /// Period of the background flush
    pub flush_interval: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            max_buffer_size: 100,
            flush_interval: Duration::from_millis(5000),
        }
    }
}

impl IngestConfig {
    /// Create config with custom output directory
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size.max(1);
        self
    }

    #[must_use]
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Get the output directory path
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path of the log-entry partition for `date`
    pub fn log_file_path(&self, date: NaiveDate) -> PathBuf {
        self.log_dir
            .join(format!("{}{}{}", LOG_FILE_PREFIX, date_key(date), FILE_EXTENSION))
    }

    /// Path of the game-event partition for `date`
    pub fn game_event_file_path(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(format!(
            "{}{}{}",
            GAME_EVENT_FILE_PREFIX,
            date_key(date),
            FILE_EXTENSION
        ))
    }
}
