//! Document model abstraction and reference closure.
//!
//! A document is captured together with every external file it uses. The
//! [`DocumentModel`] trait is the only thing the rest of the crate knows about
//! a document; [`ReferenceCollector`] turns one into the set of relative paths
//! to capture:
//!
//! ```text
//!   fonts / images / libraries / sounds      materials / lights
//!               │                                   │
//!      CATEGORY_RULES filter               node graphs, groups recursed
//!               │                                   │
//!               └──────────► resolve_relative ◄─────┘
//!                                   │
//!                          dedup by relative path
//!                                   │
//!                                   ▼
//!                        Vec<DocumentReference>
//! ```

mod collector;
mod error;
mod manifest;
mod model;
mod path;
mod rules;
mod types;

pub use collector::ReferenceCollector;
pub use error::{DocumentError, DocumentResult};
pub use manifest::{Manifest, ManifestDocument};
pub use model::DocumentModel;
pub use path::{resolve_relative, PathRejection, RELATIVE_MARKER};
pub use rules::{CategoryRule, CATEGORY_RULES};
pub use types::{
    Asset, AssetCategory, DocumentReference, ImageKind, Node, NodeHost, NodeTree, ReferenceKind,
    SourceMode, BUILTIN_PATH,
};
