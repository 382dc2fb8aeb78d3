//! docsnap - per-document version snapshots on top of git
//!
//! A document and the external files it references (images, fonts, sounds,
//! linked libraries, script sources) are captured together as one revision
//! in a repository that sits next to the document. Revisions can be listed
//! and restored.
//!
//! # Example
//!
//! ```no_run
//! use docsnap::document::ManifestDocument;
//! use docsnap::vault::{Vault, VaultConfig};
//!
//! let vault = Vault::new(VaultConfig::new());
//! let mut doc = ManifestDocument::open("scene.blend", "scene.refs.json").unwrap();
//!
//! vault.save_version(&mut doc, "blockout done").unwrap();
//! let history = vault.load_version(&doc).unwrap();
//! let oldest = history.revisions().last().unwrap();
//! vault.apply_version(&doc, &oldest.id).unwrap();
//! ```

pub mod backend;
pub mod cli;
pub mod document;
pub mod repo;
pub mod snapshot;
pub mod vault;
