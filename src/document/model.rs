//! The document abstraction the snapshot core works against.

use std::path::Path;

use crate::document::error::DocumentResult;
use crate::document::types::{Asset, AssetCategory, NodeTree};

/// A compound document that can enumerate the external files it uses.
///
/// Callers hand an explicit handle to every operation; nothing is looked up
/// from ambient state.
pub trait DocumentModel {
    /// Location of the document on disk, or `None` if it was never saved.
    fn file_path(&self) -> Option<&Path>;

    /// Assets of one top-level category.
    fn assets(&self, category: AssetCategory) -> &[Asset];

    /// Composition graphs owned directly by materials and lights.
    fn node_hosts(&self) -> Vec<&NodeTree>;

    /// A named node group, the target of group nodes.
    fn node_group(&self, name: &str) -> Option<&NodeTree>;

    /// Write in-memory state to [`DocumentModel::file_path`] so the bytes on
    /// disk are the ones captured.
    fn flush(&mut self) -> DocumentResult<()> {
        Ok(())
    }

    /// Discard in-memory state and read the document back from disk.
    fn reload(&mut self) -> DocumentResult<()> {
        Ok(())
    }
}
