//! Deterministic placement of the repository and staging tree.
//!
//! Both locations are siblings of the document file and are derived from its
//! path alone. Nothing here touches the filesystem.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Suffix appended to the document file name for the repository directory.
pub const REPOSITORY_SUFFIX: &str = ".git";

/// Suffix appended to the document file name for the staging directory.
pub const STAGING_SUFFIX: &str = ".work";

/// How the repository directory is kept out of sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidePolicy {
    /// Plain `<name>.git`, visible.
    Visible,
    /// Dot-prefixed `.<name>.git`.
    DotPrefix,
    /// Plain `<name>.git`, marked hidden with a platform attribute after the
    /// repository has been created.
    Attribute,
}

impl HidePolicy {
    /// The policy native to the current platform.
    pub fn native(hide: bool) -> Self {
        if !hide {
            HidePolicy::Visible
        } else if cfg!(windows) {
            HidePolicy::Attribute
        } else {
            HidePolicy::DotPrefix
        }
    }

    /// Whether a separate hide step must run once the repository exists.
    pub fn needs_attribute(&self) -> bool {
        matches!(self, HidePolicy::Attribute)
    }
}

/// Filesystem locations belonging to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    document: PathBuf,
    parent: PathBuf,
    file_name: OsString,
    repository: PathBuf,
    staging: PathBuf,
    hide: HidePolicy,
}

impl RepoLayout {
    /// Derive the layout for a document path.
    ///
    /// Returns `None` when the path has no file name (e.g. `/` or `..`).
    pub fn for_document(document: impl AsRef<Path>, hide: HidePolicy) -> Option<Self> {
        let document = document.as_ref();
        let file_name = document.file_name()?.to_os_string();
        let parent = match document.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let repository = parent.join(repository_dir_name(&file_name, hide));
        let staging = parent.join(suffixed(&file_name, STAGING_SUFFIX));

        Some(Self {
            document: document.to_path_buf(),
            parent,
            file_name,
            repository,
            staging,
            hide,
        })
    }

    /// The primary document file.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Directory holding the document; the working tree for read mode.
    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// Bare file name of the document.
    pub fn file_name(&self) -> &OsStr {
        &self.file_name
    }

    /// The backing repository directory.
    pub fn repository(&self) -> &Path {
        &self.repository
    }

    /// The disposable staging directory used while saving.
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    pub fn hide_policy(&self) -> HidePolicy {
        self.hide
    }

    /// Name of the repository directory, relative to the parent directory.
    pub fn repository_name(&self) -> &OsStr {
        self.repository.file_name().unwrap_or_default()
    }

    /// Name of the staging directory, relative to the parent directory.
    pub fn staging_name(&self) -> &OsStr {
        self.staging.file_name().unwrap_or_default()
    }

    /// Target of the staging tree's repository link, relative to the staging
    /// directory itself.
    pub fn repository_link_target(&self) -> PathBuf {
        Path::new("..").join(self.repository_name())
    }

    /// Whether a top-level entry of the document directory belongs to this
    /// layout's own bookkeeping and must never be captured.
    pub fn is_reserved(&self, name: &OsStr) -> bool {
        name == self.repository_name() || name == self.staging_name()
    }
}

fn repository_dir_name(file_name: &OsStr, hide: HidePolicy) -> OsString {
    match hide {
        HidePolicy::DotPrefix => {
            let mut name = OsString::from(".");
            name.push(suffixed(file_name, REPOSITORY_SUFFIX));
            name
        }
        HidePolicy::Visible | HidePolicy::Attribute => suffixed(file_name, REPOSITORY_SUFFIX),
    }
}

fn suffixed(file_name: &OsStr, suffix: &str) -> OsString {
    let mut name = file_name.to_os_string();
    name.push(suffix);
    name
}
