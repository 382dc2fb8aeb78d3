//! Errors surfaced to callers of the vault.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;
use crate::document::DocumentError;
use crate::snapshot::SnapshotError;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Vault errors.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("the document has not been saved to disk yet")]
    DocumentUnsaved,

    #[error("not a document file path: {0}")]
    InvalidDocumentPath(PathBuf),

    #[error("a version needs a non-empty message")]
    EmptyMessage,

    #[error("not a revision id: {0:?}")]
    InvalidRevision(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to {action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("commit produced no revision in {0}")]
    MissingRevision(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Refused at the boundary, before anything was touched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VaultError::DocumentUnsaved
                | VaultError::InvalidDocumentPath(_)
                | VaultError::EmptyMessage
                | VaultError::InvalidRevision(_)
        )
    }
}

impl From<SnapshotError> for VaultError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Backend(e) => VaultError::Backend(e),
            SnapshotError::Filesystem { action, path, source } => VaultError::Filesystem { action, path, source },
            SnapshotError::MissingRevision(path) => VaultError::MissingRevision(path),
        }
    }
}
