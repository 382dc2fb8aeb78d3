//! Document model error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a document model implementation.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// reading or writing the document or its manifest failed
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// the manifest is not valid JSON for the expected shape
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// result type alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
