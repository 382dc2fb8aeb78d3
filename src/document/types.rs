//! Document model value types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Path value marking a font that ships with the host application.
pub const BUILTIN_PATH: &str = "<builtin>";

/// Top-level asset categories that may live in external files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Font,
    Image,
    Library,
    Sound,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::Font,
        AssetCategory::Image,
        AssetCategory::Library,
        AssetCategory::Sound,
    ];
}

/// What an image datablock is backed by.
///
/// Only [`ImageKind::Image`] is read from a file the user owns; the rest are
/// produced by the host at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageKind {
    #[default]
    Image,
    Multilayer,
    UvTest,
    RenderResult,
    Compositing,
}

/// One asset of a top-level category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub filepath: String,
    /// Bytes are stored inside the document itself.
    #[serde(default)]
    pub packed: bool,
    /// Only meaningful for images; absent means a file-backed image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_kind: Option<ImageKind>,
}

impl Asset {
    pub fn new(name: impl Into<String>, filepath: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filepath: filepath.into(),
            packed: false,
            image_kind: None,
        }
    }

    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    pub fn with_image_kind(mut self, kind: ImageKind) -> Self {
        self.image_kind = Some(kind);
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.filepath == BUILTIN_PATH
    }
}

/// Where a script-like node reads its source from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    #[default]
    Internal,
    External,
}

/// A node in a composition graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Instance of a named node group.
    Group { tree: String },
    /// Shading script, inline or from a file.
    Script {
        #[serde(default)]
        filepath: String,
        #[serde(default)]
        mode: SourceMode,
    },
    /// Light profile, inline or from a file.
    Ies {
        #[serde(default)]
        filepath: String,
        #[serde(default)]
        mode: SourceMode,
    },
    #[serde(other)]
    Other,
}

impl Node {
    /// Path of a leaf that is configured to read an external file.
    pub fn external_source(&self) -> Option<&str> {
        match self {
            Node::Script {
                filepath,
                mode: SourceMode::External,
            }
            | Node::Ies {
                filepath,
                mode: SourceMode::External,
            } => Some(filepath.as_str()),
            _ => None,
        }
    }
}

/// A composition graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTree {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl NodeTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

/// An asset that may own a composition graph (materials, lights).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHost {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_tree: Option<NodeTree>,
}

/// Kind of file a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Font,
    Image,
    Library,
    Sound,
    ScriptAsset,
}

impl From<AssetCategory> for ReferenceKind {
    fn from(category: AssetCategory) -> Self {
        match category {
            AssetCategory::Font => ReferenceKind::Font,
            AssetCategory::Image => ReferenceKind::Image,
            AssetCategory::Library => ReferenceKind::Library,
            AssetCategory::Sound => ReferenceKind::Sound,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Font => "font",
            ReferenceKind::Image => "image",
            ReferenceKind::Library => "library",
            ReferenceKind::Sound => "sound",
            ReferenceKind::ScriptAsset => "script",
        };
        f.pad(name)
    }
}

/// An external file the document depends on, relative to its directory.
///
/// Identity is the relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub relative_path: PathBuf,
    pub kind: ReferenceKind,
}
