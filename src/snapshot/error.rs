//! Snapshot error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;

/// Errors raised while assembling or committing a staging tree.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// a backend command failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// creating, linking or removing something on disk failed
    #[error("failed to {action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// the commit succeeded but the new revision could not be read back
    #[error("commit produced no revision in {0}")]
    MissingRevision(PathBuf),
}

impl SnapshotError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| SnapshotError::Filesystem { action, path, source }
    }
}

/// result type alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
