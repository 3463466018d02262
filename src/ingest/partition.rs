//! Date partitioning
//!
//! Every record lands in the file for the UTC calendar date of its event
//! timestamp. A missing or unparsable timestamp falls back to "now".

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::types::{EnrichedLogEntry, GameEventRecord};
use crate::utils::parse_timestamp;

/// Records that carry an event timestamp
pub trait Timestamped {
    fn record_id(&self) -> &str;
    fn event_timestamp(&self) -> Option<&str>;
}

impl Timestamped for EnrichedLogEntry {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn event_timestamp(&self) -> Option<&str> {
        Some(self.timestamp.as_str()).filter(|ts| !ts.is_empty())
    }
}

impl Timestamped for GameEventRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn event_timestamp(&self) -> Option<&str> {
        Some(self.timestamp.as_str()).filter(|ts| !ts.is_empty())
    }
}

/// Date key for one record, deterministic for a fixed `now`
pub fn partition_key<T: Timestamped>(record: &T, now: DateTime<Utc>) -> NaiveDate {
    match record.event_timestamp().and_then(parse_timestamp) {
        Some(at) => at.date_naive(),
        None => {
            warn!(
                id = record.record_id(),
                timestamp = record.event_timestamp().unwrap_or(""),
                "unusable record timestamp, partitioning under current date"
            );
            now.date_naive()
        }
    }
}

/// Records sharing one date key, in snapshot order
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub date: NaiveDate,
    pub records: Vec<T>,
}

/// Group records by date
///
/// Partitions are ordered by first appearance and records keep their
/// relative order inside each partition.
pub fn partition_by_date<T: Timestamped>(records: Vec<T>, now: DateTime<Utc>) -> Vec<Partition<T>> {
    let mut partitions: Vec<Partition<T>> = Vec::new();

    for record in records {
        let date = partition_key(&record, now);
        match partitions.iter_mut().find(|p| p.date == date) {
            Some(partition) => partition.records.push(record),
            None => partitions.push(Partition {
                date,
                records: vec![record],
            }),
        }
    }

    partitions
}
