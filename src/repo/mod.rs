//! Repository location for a document.
//!
//! Every document gets exactly one repository, found next to it on disk, and
//! a staging directory that only exists while a save is in progress:
//!
//! ```text
//! scenes/
//! ├── shot.blend            the document
//! ├── .shot.blend.git/      its repository (hidden)
//! └── shot.blend.work/      staging tree, present only during a save
//!     └── .git -> ../.shot.blend.git
//! ```

mod layout;

pub use layout::{HidePolicy, RepoLayout, REPOSITORY_SUFFIX, STAGING_SUFFIX};
