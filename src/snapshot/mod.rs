//! Capturing and listing snapshots.
//!
//! [`StagingTree`] is the write path: it assembles hard links to the
//! document and its references and commits them. [`History`] is the read
//! path: the revisions a caller can pick from when restoring.

mod error;
mod history;
mod staging;

pub use error::{SnapshotError, SnapshotResult};
pub use history::{compact_timestamp, label, History, HistoryEntry, NO_HISTORY_LABEL};
pub use staging::{Committed, Created, RepoEnsured, StagingTree};
