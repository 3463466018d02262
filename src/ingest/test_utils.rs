//! Test helpers: an in-memory writer with failure injection, and a
//! tracing capture for asserting on emitted events

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;

use super::writer::RecordWriter;
use crate::types::{ClientInfo, EnrichedLogEntry, LogLevel, RawLogEntry};

/// Entry with a fixed event timestamp
pub fn entry_at(message: &str, timestamp: &str) -> EnrichedLogEntry {
    EnrichedLogEntry::enrich(
        RawLogEntry::new(LogLevel::Info, "Test", message).with_timestamp(timestamp),
        &ClientInfo::new("127.0.0.1", "test"),
        None,
        Utc::now(),
    )
}

/// Shared buffer that a fmt subscriber writes into
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber scoped to this thread, returning what it logged
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}

/// Writer that keeps files in memory, keyed by file name
#[derive(Default)]
pub struct MemoryWriter {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_on: Mutex<Vec<String>>,
    fail_all: AtomicBool,
    calls: AtomicUsize,
    entered: AtomicUsize,
    hold: Option<Semaphore>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every append waits for a `release` permit
    pub fn blocking() -> Self {
        Self {
            hold: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Fail appends whose file name contains `pattern`
    pub fn fail_on(&self, pattern: &str) {
        self.fail_on.lock().push(pattern.to_string());
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn release(&self, permits: usize) {
        if let Some(hold) = &self.hold {
            hold.add_permits(permits);
        }
    }

    /// Wait until some append has started
    pub async fn wait_for_append(&self) {
        while self.entered.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }

    pub fn append_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn lines(&self, file_name: &str) -> Vec<Value> {
        let files = self.files.lock();
        let Some(body) = files.get(file_name) else {
            return Vec::new();
        };
        String::from_utf8_lossy(body)
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl RecordWriter for MemoryWriter {
    fn append<'a>(&'a self, path: &'a Path, body: &'a [u8]) -> BoxFuture<'a, io::Result<()>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.fetch_add(1, Ordering::SeqCst);

            if let Some(hold) = &self.hold {
                hold.acquire()
                    .await
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
                    .forget();
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let injected = self.fail_all.load(Ordering::SeqCst)
                || self.fail_on.lock().iter().any(|p| name.contains(p.as_str()));
            if injected {
                return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
            }

            self.files
                .lock()
                .entry(name)
                .or_default()
                .extend_from_slice(body);
            Ok(())
        })
    }
}
