//! Output directory statistics
//!
//! Scans the partition directory on every call: file counts per stream and
//! total bytes. Nothing is cached.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::config::{FILE_EXTENSION, GAME_EVENT_FILE_PREFIX, LOG_FILE_PREFIX};
use super::error::IngestResult;

/// Statistics about the output directory
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDirectoryStats {
    pub directory: String,
    pub total_files: usize,
    /// `frontend-logs-*.jsonl` files
    pub log_files: usize,
    /// `game-events-*.jsonl` files
    pub game_event_files: usize,
    /// Anything else found in the directory
    pub other_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    pub total_size_human: String,
}

impl LogDirectoryStats {
    /// Format size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.2} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }
}

/// Which stream a file in the output directory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFamily {
    Logs,
    GameEvents,
    Other,
}

impl FileFamily {
    pub fn classify(file_name: &str) -> Self {
        if !file_name.ends_with(FILE_EXTENSION) {
            FileFamily::Other
        } else if file_name.starts_with(LOG_FILE_PREFIX) {
            FileFamily::Logs
        } else if file_name.starts_with(GAME_EVENT_FILE_PREFIX) {
            FileFamily::GameEvents
        } else {
            FileFamily::Other
        }
    }
}

/// Collector for output directory statistics
pub struct StatsCollector {
    log_dir: PathBuf,
}

impl StatsCollector {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }

    /// Scan the directory
    pub fn collect(&self) -> IngestResult<LogDirectoryStats> {
        let mut stats = LogDirectoryStats {
            directory: self.log_dir.display().to_string(),
            ..Default::default()
        };

        if self.log_dir.exists() {
            for dir_entry in fs::read_dir(&self.log_dir)? {
                let dir_entry = dir_entry?;
                let metadata = dir_entry.metadata()?;
                if !metadata.is_file() {
                    continue;
                }

                let name = dir_entry.file_name();
                match FileFamily::classify(&name.to_string_lossy()) {
                    FileFamily::Logs => stats.log_files += 1,
                    FileFamily::GameEvents => stats.game_event_files += 1,
                    FileFamily::Other => stats.other_files += 1,
                }
                stats.total_files += 1;
                stats.total_size += metadata.len();
            }
        }

        stats.total_size_human = LogDirectoryStats::format_size(stats.total_size);
        Ok(stats)
    }
}
