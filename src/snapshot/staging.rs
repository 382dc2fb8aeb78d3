//! Staging tree lifecycle using the typestate pattern.
//!
//! A save assembles the document and its references as hard links in a
//! sibling directory whose `.git` points at the real repository, then commits
//! from there:
//!
//! ```text
//! StagingTree<Created> ──ensure_repository──► StagingTree<RepoEnsured>
//!                                               │ link (primary, refs...)
//!                                               │ add_linked
//!                                               ▼
//!                                       StagingTree<Committed> ──finish──► Revision
//! ```
//!
//! The directory belongs to a drop guard, so it is removed on every path out
//! of a save, including early returns through `?`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::backend::{GitBackend, Mode, Revision};
use crate::snapshot::error::{SnapshotError, SnapshotResult};

/// Name of the repository link inside the staging tree.
const REPOSITORY_LINK: &str = ".git";

/// Staging directory exists and links to the repository location.
#[derive(Debug)]
pub struct Created;

/// The repository behind the link exists and accepts commits.
#[derive(Debug)]
pub struct RepoEnsured;

/// A revision has been recorded.
#[derive(Debug)]
pub struct Committed {
    revision: Revision,
}

/// Removes the staging directory when dropped unless already removed.
#[derive(Debug)]
struct StagingGuard {
    path: PathBuf,
    armed: bool,
}

impl StagingGuard {
    fn remove(mut self) -> io::Result<()> {
        self.armed = false;
        fs::remove_dir_all(&self.path)
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("removed staging tree {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("could not remove staging tree {}: {}", self.path.display(), e),
        }
    }
}

/// The disposable tree a save is committed from.
#[derive(Debug)]
pub struct StagingTree<'b, S> {
    guard: StagingGuard,
    backend: &'b GitBackend,
    linked: Vec<PathBuf>,
    state: S,
}

impl<'b, S> StagingTree<'b, S> {
    /// Location of the staging directory.
    pub fn path(&self) -> &Path {
        &self.guard.path
    }

    /// Paths linked so far, relative to the staging directory.
    pub fn linked(&self) -> &[PathBuf] {
        &self.linked
    }

    fn into_state<T>(self, state: T) -> StagingTree<'b, T> {
        let StagingTree {
            guard,
            backend,
            linked,
            ..
        } = self;
        StagingTree {
            guard,
            backend,
            linked,
            state,
        }
    }
}

impl<'b> StagingTree<'b, Created> {
    /// Create the staging directory and its repository link.
    ///
    /// A directory left behind by an interrupted save is discarded and
    /// created afresh.
    pub fn create(backend: &'b GitBackend) -> SnapshotResult<Self> {
        let path = backend.layout().staging().to_path_buf();

        match fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                warn!("recreating stale staging tree {}", path.display());
                fs::remove_dir_all(&path).map_err(SnapshotError::fs("remove stale staging tree", &path))?;
                fs::create_dir(&path).map_err(SnapshotError::fs("create staging tree", &path))?;
            }
            Err(e) => return Err(SnapshotError::fs("create staging tree", &path)(e)),
        }

        let tree = StagingTree {
            guard: StagingGuard { path, armed: true },
            backend,
            linked: Vec::new(),
            state: Created,
        };
        tree.ensure_repository_link()?;
        Ok(tree)
    }

    fn ensure_repository_link(&self) -> SnapshotResult<()> {
        let link = self.path().join(REPOSITORY_LINK);
        if fs::symlink_metadata(&link).is_ok() {
            return Ok(());
        }
        let target = self.backend.layout().repository_link_target();
        write_repository_link(&target, &link).map_err(SnapshotError::fs("link repository at", &link))
    }

    /// Make sure the repository exists, creating it on first save.
    pub fn ensure_repository(self) -> SnapshotResult<StagingTree<'b, RepoEnsured>> {
        let layout = self.backend.layout();
        let repository = layout.repository();

        if !repository.join("HEAD").exists() {
            fs::create_dir_all(repository).map_err(SnapshotError::fs("create repository", repository))?;
            self.backend.init()?;
            // git records the staging tree as the worktree when the repository
            // lives elsewhere; read mode needs the document directory instead.
            self.backend.unset_config("core.worktree")?;
            if layout.hide_policy().needs_attribute() {
                self.backend.hide_repository()?;
            }
            info!("created repository {}", repository.display());
        }

        Ok(self.into_state(RepoEnsured))
    }
}

impl<'b> StagingTree<'b, RepoEnsured> {
    /// Hard-link `source` into the staging tree at `relative`.
    ///
    /// Symlinks are resolved first so the tree holds the file content.
    /// Returns `false` if something was already linked there.
    pub fn link(&mut self, relative: &Path, source: &Path) -> SnapshotResult<bool> {
        let resolved = fs::canonicalize(source).map_err(SnapshotError::fs("resolve", source))?;
        let dest = self.path().join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(SnapshotError::fs("create directory", parent))?;
        }

        match fs::hard_link(&resolved, &dest) {
            Ok(()) => {
                debug!("linked {} -> {}", resolved.display(), dest.display());
                self.linked.push(relative.to_path_buf());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(SnapshotError::fs("hard-link", &resolved)(e)),
        }
    }

    /// Stage every linked path, one backend call each.
    pub fn add_linked(&self) -> SnapshotResult<()> {
        for path in &self.linked {
            self.backend.add(path)?;
        }
        Ok(())
    }

    /// Record the staged content as a new revision.
    pub fn commit(self, message: &str) -> SnapshotResult<StagingTree<'b, Committed>> {
        self.backend.commit(message)?;
        let revision = self
            .backend
            .log(Mode::Write, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| SnapshotError::MissingRevision(self.backend.layout().repository().to_path_buf()))?;

        info!("saved revision {} ({} files)", revision.id.short(), self.linked.len());
        Ok(self.into_state(Committed { revision }))
    }
}

impl<'b> StagingTree<'b, Committed> {
    pub fn revision(&self) -> &Revision {
        &self.state.revision
    }

    /// Remove the staging directory and hand back the new revision.
    ///
    /// The revision already exists, so a failed cleanup is only logged.
    pub fn finish(self) -> Revision {
        let StagingTree { guard, state, .. } = self;
        let path = guard.path.clone();
        match guard.remove() {
            Ok(()) => debug!("removed staging tree {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("could not remove staging tree {}: {}", path.display(), e),
        }
        state.revision
    }
}

#[cfg(unix)]
fn write_repository_link(target: &Path, link: &Path) -> io::Result<()> {
    // The target may not exist yet; init creates it through the link.
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn write_repository_link(target: &Path, link: &Path) -> io::Result<()> {
    let target = target.to_string_lossy().replace('\\', "/");
    fs::write(link, format!("gitdir: {}\n", target))
}
