//! Version-control backend adapter.
//!
//! The rest of the crate never spawns processes itself; it goes through
//! [`GitBackend`], which turns raw git output into typed results and failed
//! invocations into [`BackendError::Command`].
//!
//! ```text
//!   load / restore                       save
//!        │                                │
//!        ▼                                ▼
//!   Mode::Read                       Mode::Write
//!   cwd = document dir               cwd = staging tree
//!   GIT_DIR = repository             GIT_DIR unset, .git link
//!   log, checkout -f                 init, config, add, commit
//! ```

mod error;
mod git;
mod history;
mod types;

pub use error::{BackendError, BackendResult};
pub use git::{GitBackend, Mode};
pub use history::{parse_history, HISTORY_FORMAT};
pub use types::{Revision, RevisionId, Signature};
