//! JSON manifest backed document model.
//!
//! For documents whose host application is not linked in, the external
//! references are described in a JSON file next to the document:
//!
//! ```json
//! {
//!   "images": [{ "name": "wood", "filepath": "//textures/wood.png" }],
//!   "fonts": [{ "name": "Bfont", "filepath": "<builtin>" }],
//!   "materials": [{ "name": "Floor", "node_tree": { "nodes": [
//!     { "type": "group", "tree": "Varnish" }
//!   ]}}],
//!   "node_groups": { "Varnish": { "nodes": [
//!     { "type": "script", "filepath": "//osl/varnish.osl", "mode": "external" }
//!   ]}}
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::error::{DocumentError, DocumentResult};
use crate::document::model::DocumentModel;
use crate::document::types::{Asset, AssetCategory, NodeHost, NodeTree};

/// Serialized description of a document's external references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub fonts: Vec<Asset>,
    pub images: Vec<Asset>,
    pub libraries: Vec<Asset>,
    pub sounds: Vec<Asset>,
    pub materials: Vec<NodeHost>,
    pub lights: Vec<NodeHost>,
    pub node_groups: BTreeMap<String, NodeTree>,
}

impl Manifest {
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A document file on disk plus an optional manifest of its references.
#[derive(Debug, Clone, Default)]
pub struct ManifestDocument {
    path: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
    manifest: Manifest,
}

impl ManifestDocument {
    /// A document with no recorded external references.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// A document that has never been written to disk.
    pub fn unsaved(manifest: Manifest) -> Self {
        Self {
            manifest,
            ..Default::default()
        }
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Open a document and read its manifest from `manifest_path`.
    pub fn open(path: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> DocumentResult<Self> {
        let manifest_path = manifest_path.into();
        let manifest = Manifest::load(&manifest_path)?;
        Ok(Self {
            path: Some(path.into()),
            manifest_path: Some(manifest_path),
            manifest,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl DocumentModel for ManifestDocument {
    fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn assets(&self, category: AssetCategory) -> &[Asset] {
        match category {
            AssetCategory::Font => &self.manifest.fonts,
            AssetCategory::Image => &self.manifest.images,
            AssetCategory::Library => &self.manifest.libraries,
            AssetCategory::Sound => &self.manifest.sounds,
        }
    }

    fn node_hosts(&self) -> Vec<&NodeTree> {
        self.manifest
            .materials
            .iter()
            .chain(&self.manifest.lights)
            .filter_map(|host| host.node_tree.as_ref())
            .collect()
    }

    fn node_group(&self, name: &str) -> Option<&NodeTree> {
        self.manifest.node_groups.get(name)
    }

    fn reload(&mut self) -> DocumentResult<()> {
        if let Some(path) = &self.manifest_path {
            self.manifest = Manifest::load(path)?;
        }
        Ok(())
    }
}
