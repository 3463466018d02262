//! In-memory log buffer
//!
//! Ordered queue of enriched entries waiting for the next flush. Capacity is
//! soft: the controller uses the length to trigger a flush, the buffer itself
//! never refuses an entry.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::types::EnrichedLogEntry;

/// Ordered, shared buffer of pending log entries
#[derive(Debug, Default)]
pub struct LogBuffer {
    entries: Mutex<VecDeque<EnrichedLogEntry>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its id and the new buffer length
    pub fn append(&self, entry: EnrichedLogEntry) -> (String, usize) {
        let id = entry.id.clone();
        let mut entries = self.entries.lock();
        entries.push_back(entry);
        (id, entries.len())
    }

    /// Append several entries under one lock, returning the new length
    pub fn extend(&self, batch: impl IntoIterator<Item = EnrichedLogEntry>) -> usize {
        let mut entries = self.entries.lock();
        entries.extend(batch);
        entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Take the whole contents, leaving the buffer empty
    pub fn drain(&self) -> Vec<EnrichedLogEntry> {
        let mut entries = self.entries.lock();
        std::mem::take(&mut *entries).into()
    }

    /// Put entries back at the front, ahead of anything appended since the drain
    pub fn restore(&self, restored: Vec<EnrichedLogEntry>) {
        if restored.is_empty() {
            return;
        }
        let mut entries = self.entries.lock();
        for entry in restored.into_iter().rev() {
            entries.push_front(entry);
        }
    }

    /// Drop everything, returning how many entries were discarded
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<EnrichedLogEntry> {
        self.entries.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientInfo, LogLevel, RawLogEntry};
    use chrono::Utc;

    fn entry(message: &str) -> EnrichedLogEntry {
        EnrichedLogEntry::enrich(
            RawLogEntry::new(LogLevel::Info, "Test", message),
            &ClientInfo::unknown(),
            None,
            Utc::now(),
        )
    }

    fn messages(entries: &[EnrichedLogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.entry.message.clone()).collect()
    }

    #[test]
    fn test_append_reports_size() {
        let buffer = LogBuffer::new();
        let first = entry("a");
        let first_id = first.id.clone();

        let (id, size) = buffer.append(first);
        assert_eq!(id, first_id);
        assert_eq!(size, 1);

        buffer.append(entry("b"));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_drain_empties_buffer() {
        let buffer = LogBuffer::new();
        buffer.append(entry("a"));
        buffer.append(entry("b"));

        let drained = buffer.drain();
        assert_eq!(messages(&drained), vec!["a", "b"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_restore_goes_before_newer_entries() {
        let buffer = LogBuffer::new();
        buffer.append(entry("a"));
        buffer.append(entry("b"));
        let drained = buffer.drain();

        // arrives while the flush is writing
        buffer.append(entry("c"));
        buffer.restore(drained);

        assert_eq!(messages(&buffer.snapshot()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear_returns_count() {
        let buffer = LogBuffer::new();
        buffer.extend(vec![entry("a"), entry("b"), entry("c")]);

        assert_eq!(buffer.clear(), 3);
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.clear(), 0);
    }
}
