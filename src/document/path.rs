//! Resolution of document-relative reference paths.
//!
//! The document model writes references relative to the document's own
//! directory with a leading `//`. A usable reference stays inside that
//! directory once `.` and `..` are applied.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Prefix marking a path as relative to the document's directory.
pub const RELATIVE_MARKER: &str = "//";

/// Why a reference path was not captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("not relative to the document")]
    NotRelative,
    #[error("names no file")]
    Empty,
    #[error("escapes the document directory")]
    EscapesDocument,
    #[error("contains a root or drive prefix")]
    Rooted,
}

/// Resolve a reference path to a normalised path under the document directory.
pub fn resolve_relative(filepath: &str) -> Result<PathBuf, PathRejection> {
    let rest = filepath
        .strip_prefix(RELATIVE_MARKER)
        .ok_or(PathRejection::NotRelative)?;
    let rest = rest.replace('\\', "/");

    let mut resolved = PathBuf::new();
    let mut depth = 0usize;
    for component in Path::new(&rest).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(PathRejection::EscapesDocument);
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(PathRejection::Rooted),
        }
    }

    if depth == 0 {
        Err(PathRejection::Empty)
    } else {
        Ok(resolved)
    }
}
