//! JSONL file writer
//!
//! One JSON object per line, appended to the partition file. All records of
//! a partition go out in a single append, and a failed append leaves the file
//! exactly as it was so a retried partition never lands after a torn line.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

/// Appends encoded bytes to a file
///
/// Failures are reported, never retried here: retry belongs to the flush.
pub trait RecordWriter: Send + Sync {
    fn append<'a>(&'a self, path: &'a Path, body: &'a [u8]) -> BoxFuture<'a, io::Result<()>>;
}

/// Writer backed by the local filesystem
#[derive(Debug, Clone, Default)]
pub struct JsonlFileWriter {
    /// fsync after every append
    pub sync: bool,
    /// Appends run one at a time so a rollback can only cut its own bytes
    appends: Arc<Mutex<()>>,
}

impl JsonlFileWriter {
    pub fn new() -> Self {
        Self {
            sync: true,
            ..Self::default()
        }
    }

    /// Skip fsync (tests, throwaway directories)
    pub fn without_sync() -> Self {
        Self::default()
    }
}

impl RecordWriter for JsonlFileWriter {
    fn append<'a>(&'a self, path: &'a Path, body: &'a [u8]) -> BoxFuture<'a, io::Result<()>> {
        let path = path.to_path_buf();
        let body = body.to_vec();
        let sync = self.sync;
        let appends = self.appends.clone();

        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let _guard = appends.lock();
                append_or_truncate(&path, &body, sync, |file, body| file.write_all(body))
            })
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
        })
    }
}

/// Append `body` to `path`, cutting the file back to its previous length if
/// the write (or the sync) fails part way
fn append_or_truncate<F>(path: &Path, body: &[u8], sync: bool, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
{
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let original_len = file.metadata()?.len();

    let result = write(&mut file, body).and_then(|()| if sync { file.sync_data() } else { Ok(()) });

    if let Err(e) = result {
        match file.set_len(original_len) {
            Ok(()) => warn!(
                path = %path.display(),
                len = original_len,
                error = %e,
                "append failed, file truncated to previous length"
            ),
            Err(truncate_err) => error!(
                path = %path.display(),
                error = %truncate_err,
                "append failed and partial write could not be rolled back"
            ),
        }
        return Err(e);
    }
    Ok(())
}

/// Encode records as newline-terminated JSON lines
pub fn encode_lines<T: Serialize>(records: &[T]) -> serde_json::Result<Vec<u8>> {
    let mut body = Vec::with_capacity(records.len() * 256);
    for record in records {
        serde_json::to_writer(&mut body, record)?;
        body.push(b'\n');
    }
    Ok(body)
}

/// Read a JSONL file back, skipping blank and unparsable lines
pub fn read_records<T: DeserializeOwned>(path: &Path) -> io::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), line = line_num + 1, error = %e, "skipping unparsable record");
            }
        }
    }

    Ok(records)
}
