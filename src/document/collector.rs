//! Reference closure collection.
//!
//! Walks a document's assets and composition graphs and returns every
//! external file that has to be captured with it, each path once.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Component, PathBuf};

use log::{debug, warn};

use crate::document::model::DocumentModel;
use crate::document::path::{resolve_relative, PathRejection};
use crate::document::rules::CATEGORY_RULES;
use crate::document::types::{Asset, DocumentReference, Node, NodeTree, ReferenceKind};

/// Collects the deduplicated reference closure of a document.
///
/// The first reference seen for a path wins; later ones are dropped.
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    reserved: HashSet<OsString>,
    seen: HashSet<PathBuf>,
    visited_groups: HashSet<String>,
    references: Vec<DocumentReference>,
}

impl ReferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never capture anything under this top-level name.
    pub fn reserve(mut self, name: impl Into<OsString>) -> Self {
        self.reserved.insert(name.into());
        self
    }

    /// Treat a path as already captured, without reporting it.
    pub fn mark_seen(mut self, path: impl Into<PathBuf>) -> Self {
        self.seen.insert(path.into());
        self
    }

    /// Walk the document and return its references in discovery order.
    pub fn collect<D: DocumentModel + ?Sized>(mut self, doc: &D) -> Vec<DocumentReference> {
        for rule in CATEGORY_RULES {
            for asset in doc.assets(rule.category) {
                if asset.packed {
                    debug!("skipping packed {:?} {:?}", rule.category, asset.name);
                    continue;
                }
                if !rule.admits(asset) {
                    debug!("{:?} {:?} not captured by category rule", rule.category, asset.name);
                    continue;
                }
                self.consider(asset_label(asset), &asset.filepath, rule.category.into());
            }
        }

        for tree in doc.node_hosts() {
            self.walk(doc, tree);
        }

        self.references
    }

    fn walk<D: DocumentModel + ?Sized>(&mut self, doc: &D, tree: &NodeTree) {
        for node in &tree.nodes {
            if let Node::Group { tree: name } = node {
                if !self.visited_groups.insert(name.clone()) {
                    continue;
                }
                match doc.node_group(name) {
                    Some(group) => self.walk(doc, group),
                    None => debug!("group node refers to unknown node group {:?}", name),
                }
            } else if let Some(filepath) = node.external_source() {
                self.consider(filepath, filepath, ReferenceKind::ScriptAsset);
            }
        }
    }

    fn consider(&mut self, label: &str, filepath: &str, kind: ReferenceKind) {
        let relative_path = match resolve_relative(filepath) {
            Ok(path) => path,
            Err(PathRejection::NotRelative) if filepath.is_empty() => return,
            Err(PathRejection::NotRelative) => {
                debug!("{} {:?} is not document-relative, not captured", kind, label);
                return;
            }
            Err(reason) => {
                warn!("{} {:?} path {:?} {}, not captured", kind, label, filepath, reason);
                return;
            }
        };

        if let Some(Component::Normal(first)) = relative_path.components().next() {
            if self.reserved.contains(first) {
                warn!("{} {:?} points into {:?}, not captured", kind, label, first);
                return;
            }
        }

        if self.seen.insert(relative_path.clone()) {
            self.references.push(DocumentReference { relative_path, kind });
        }
    }
}

fn asset_label(asset: &Asset) -> &str {
    if asset.name.is_empty() {
        &asset.filepath
    } else {
        &asset.name
    }
}
