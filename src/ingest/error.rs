//! Ingestion error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Coarse classification used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    Validation,
    Persistence,
    Internal,
}

/// Errors that can occur while ingesting or persisting telemetry
#[derive(Debug, Error)]
pub enum IngestError {
    /// The output directory has not been prepared yet
    #[error("log controller is not initialized")]
    NotInitialized,

    /// Malformed request shape, rejected before buffering
    #[error("validation failed: {0}")]
    Validation(String),

    /// A partition write failed; `restored` entries went back to the buffer
    #[error("failed to write '{}' ({restored} entries restored): {source}", .path.display())]
    Persistence {
        path: PathBuf,
        restored: usize,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Anything else that went wrong while handling a request
    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::NotInitialized => ErrorKind::NotInitialized,
            IngestError::Validation(_) => ErrorKind::Validation,
            IngestError::Persistence { .. } => ErrorKind::Persistence,
            IngestError::Serialization(_) | IngestError::Io(_) | IngestError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(IngestError::NotInitialized.kind(), ErrorKind::NotInitialized);
        assert_eq!(
            IngestError::Validation("bad".to_string()).kind(),
            ErrorKind::Validation
        );
        let err = IngestError::Persistence {
            path: PathBuf::from("x.jsonl"),
            restored: 3,
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(
            err.to_string(),
            "failed to write 'x.jsonl' (3 entries restored): disk full"
        );
        assert_eq!(
            IngestError::from(io::Error::new(io::ErrorKind::Other, "boom")).kind(),
            ErrorKind::Internal
        );
    }
}
