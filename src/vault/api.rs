//! Vault API - saving and restoring versions of a document.

use std::path::{Path, PathBuf};

use log::info;

use crate::backend::{GitBackend, Mode, Revision, RevisionId};
use crate::document::{DocumentModel, DocumentReference, ReferenceCollector};
use crate::repo::{HidePolicy, RepoLayout};
use crate::snapshot::{History, StagingTree};
use crate::vault::config::VaultConfig;
use crate::vault::error::{VaultError, VaultResult};

/// What a successful save produced.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub revision: Revision,
    /// References captured alongside the document itself.
    pub references: Vec<DocumentReference>,
}

/// A completed restore. The document changed on disk underneath any
/// in-memory copy, which must be discarded and read again from `reload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub revision: RevisionId,
    pub reload: PathBuf,
}

/// Saves and restores versions of documents.
///
/// Holds no per-document state: locations are derived afresh from the
/// document path on every call.
#[derive(Debug, Clone, Default)]
pub struct Vault {
    config: VaultConfig,
}

impl Vault {
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Repository and staging locations for a document.
    pub fn layout<D: DocumentModel + ?Sized>(&self, doc: &D) -> VaultResult<RepoLayout> {
        let path = doc.file_path().ok_or(VaultError::DocumentUnsaved)?;
        let path = std::path::absolute(path).map_err(|source| VaultError::Filesystem {
            action: "resolve",
            path: path.to_path_buf(),
            source,
        })?;
        RepoLayout::for_document(&path, HidePolicy::native(self.config.hide_repository))
            .ok_or(VaultError::InvalidDocumentPath(path))
    }

    fn backend(&self, layout: RepoLayout) -> GitBackend {
        GitBackend::new(&self.config.git_program, layout).with_signature(self.config.signature.clone())
    }

    /// The reference closure that a save would capture.
    pub fn references<D: DocumentModel + ?Sized>(&self, doc: &D) -> VaultResult<Vec<DocumentReference>> {
        let layout = self.layout(doc)?;
        Ok(collect(&layout, doc))
    }

    /// Capture the document and everything it references as a new revision.
    pub fn save_version<D: DocumentModel + ?Sized>(&self, doc: &mut D, message: &str) -> VaultResult<SaveOutcome> {
        let layout = self.layout(&*doc)?;
        if message.trim().is_empty() {
            return Err(VaultError::EmptyMessage);
        }

        doc.flush()?;
        let references = collect(&layout, &*doc);
        let backend = self.backend(layout);
        let layout = backend.layout();

        let mut tree = StagingTree::create(&backend)?.ensure_repository()?;
        tree.link(Path::new(layout.file_name()), layout.document())?;
        for reference in &references {
            let source = layout.parent().join(&reference.relative_path);
            tree.link(&reference.relative_path, &source)?;
        }
        tree.add_linked()?;
        let revision = tree.commit(message)?.finish();

        Ok(SaveOutcome { revision, references })
    }

    /// Revisions of the document, newest first.
    ///
    /// A document that was never versioned yields [`History::Empty`].
    pub fn load_version<D: DocumentModel + ?Sized>(&self, doc: &D) -> VaultResult<History> {
        let backend = self.backend(self.layout(doc)?);
        if !backend.layout().repository().is_dir() || !backend.has_revisions()? {
            return Ok(History::Empty);
        }
        Ok(History::Revisions(backend.log(Mode::Read, None)?))
    }

    /// Force the document directory's tracked files back to `revision`.
    ///
    /// Local modifications to those files are discarded without asking;
    /// confirming is up to the caller.
    pub fn apply_version<D: DocumentModel + ?Sized>(&self, doc: &D, revision: &RevisionId) -> VaultResult<Restored> {
        let backend = self.backend(self.layout(doc)?);
        if revision.is_ambiguous() {
            return Err(VaultError::InvalidRevision(revision.to_string()));
        }

        backend.checkout_force(revision, &[])?;
        info!("restored {} to {}", backend.layout().document().display(), revision.short());

        Ok(Restored {
            revision: revision.clone(),
            reload: backend.layout().document().to_path_buf(),
        })
    }
}

fn collect<D: DocumentModel + ?Sized>(layout: &RepoLayout, doc: &D) -> Vec<DocumentReference> {
    ReferenceCollector::new()
        .reserve(layout.repository_name())
        .reserve(layout.staging_name())
        .mark_seen(layout.file_name())
        .collect(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, Signature};
    use crate::document::{Asset, Manifest, ManifestDocument, Node, NodeHost, NodeTree, SourceMode};
    use std::fs;
    use tempfile::TempDir;

    fn vault() -> Vault {
        Vault::new(VaultConfig::new().signature(Signature::new("Test", "test@example.com")))
    }

    fn write(dir: &TempDir, relative: &str, contents: &[u8]) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// `doc.blend` referencing `textures/a.png`.
    fn scene(dir: &TempDir) -> ManifestDocument {
        write(dir, "doc.blend", b"scene v1");
        write(dir, "textures/a.png", b"pixels");
        let manifest = Manifest {
            images: vec![Asset::new("a", "//textures/a.png")],
            ..Default::default()
        };
        ManifestDocument::new(dir.path().join("doc.blend")).with_manifest(manifest)
    }

    fn open_repo(dir: &TempDir) -> git2::Repository {
        git2::Repository::open(dir.path().join(".doc.blend.git")).unwrap()
    }

    fn tree_of(repo: &git2::Repository, id: &RevisionId) -> git2::Oid {
        repo.find_commit(git2::Oid::from_str(id.as_str()).unwrap())
            .unwrap()
            .tree_id()
    }

    #[test]
    fn test_save_creates_hidden_repository_and_revision() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let vault = vault();

        let outcome = vault.save_version(&mut doc, "v1").unwrap();
        assert_eq!(outcome.revision.message, "v1");
        assert_eq!(outcome.references.len(), 1);

        assert!(dir.path().join(".doc.blend.git").is_dir());
        assert!(!dir.path().join("doc.blend.work").exists());

        let history = vault.load_version(&doc).unwrap();
        assert_eq!(history.revisions().len(), 1);
        assert_eq!(history.revisions()[0].id, outcome.revision.id);
    }

    #[test]
    fn test_committed_files_are_content_not_symlinks() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let outcome = vault().save_version(&mut doc, "v1").unwrap();

        let repo = open_repo(&dir);
        let tree = repo.find_tree(tree_of(&repo, &outcome.revision.id)).unwrap();
        for path in ["doc.blend", "textures/a.png"] {
            let entry = tree.get_path(Path::new(path)).unwrap();
            assert_eq!(entry.filemode(), 0o100644, "{path}");
        }
        assert!(tree.get_path(Path::new(".git")).is_err());

        let blob = repo
            .find_blob(tree.get_path(Path::new("textures/a.png")).unwrap().id())
            .unwrap();
        assert_eq!(blob.content(), b"pixels");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_committed_as_content() {
        let dir = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        fs::write(library.path().join("wood.png"), b"pixels").unwrap();
        fs::write(library.path().join("scene.blend"), b"scene v1").unwrap();
        fs::create_dir_all(dir.path().join("textures")).unwrap();
        std::os::unix::fs::symlink(library.path().join("wood.png"), dir.path().join("textures/wood.png")).unwrap();
        std::os::unix::fs::symlink(library.path().join("scene.blend"), dir.path().join("doc.blend")).unwrap();

        let manifest = Manifest {
            images: vec![Asset::new("wood", "//textures/wood.png")],
            ..Default::default()
        };
        let mut doc = ManifestDocument::new(dir.path().join("doc.blend")).with_manifest(manifest);
        let outcome = vault().save_version(&mut doc, "v1").unwrap();

        let repo = open_repo(&dir);
        let tree = repo.find_tree(tree_of(&repo, &outcome.revision.id)).unwrap();
        for (path, contents) in [("textures/wood.png", &b"pixels"[..]), ("doc.blend", &b"scene v1"[..])] {
            let entry = tree.get_path(Path::new(path)).unwrap();
            assert_eq!(entry.filemode(), 0o100644, "{path}");
            assert_eq!(repo.find_blob(entry.id()).unwrap().content(), contents, "{path}");
        }
    }

    #[test]
    fn test_repeated_save_without_changes() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let vault = vault();

        let first = vault.save_version(&mut doc, "first").unwrap();
        let second = vault.save_version(&mut doc, "again").unwrap();
        assert_ne!(first.revision.id, second.revision.id);

        let repo = open_repo(&dir);
        assert_eq!(tree_of(&repo, &first.revision.id), tree_of(&repo, &second.revision.id));
        assert_eq!(vault.load_version(&doc).unwrap().revisions().len(), 2);
    }

    #[test]
    fn test_empty_message_rejected_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let vault = vault();

        for message in ["", "   ", "\n\t"] {
            let err = vault.save_version(&mut doc, message).unwrap_err();
            assert!(matches!(err, VaultError::EmptyMessage));
        }
        assert!(!dir.path().join(".doc.blend.git").exists());
        assert!(!dir.path().join("doc.blend.work").exists());
        assert_eq!(vault.load_version(&doc).unwrap(), History::Empty);
    }

    #[test]
    fn test_unsaved_document_refused() {
        let mut doc = ManifestDocument::unsaved(Manifest::default());
        let vault = vault();

        assert!(matches!(vault.save_version(&mut doc, "v1"), Err(VaultError::DocumentUnsaved)));
        assert!(matches!(vault.load_version(&doc), Err(VaultError::DocumentUnsaved)));
        assert!(matches!(
            vault.apply_version(&doc, &RevisionId::new("abc")),
            Err(VaultError::DocumentUnsaved)
        ));
    }

    #[test]
    fn test_load_without_repository_is_empty() {
        let dir = TempDir::new().unwrap();
        let doc = scene(&dir);
        let history = vault().load_version(&doc).unwrap();
        assert_eq!(history, History::Empty);
        assert!(history.is_empty());
    }

    #[test]
    fn test_restore_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let vault = vault();

        let v1 = vault.save_version(&mut doc, "v1").unwrap().revision;
        write(&dir, "doc.blend", b"scene v2");
        write(&dir, "textures/a.png", b"repainted");
        vault.save_version(&mut doc, "v2").unwrap();

        let history = vault.load_version(&doc).unwrap();
        let messages: Vec<_> = history.revisions().iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["v2", "v1"]);

        // Uncommitted edits are discarded too.
        write(&dir, "doc.blend", b"scratch work");

        let restored = vault.apply_version(&doc, &v1.id).unwrap();
        assert_eq!(restored.revision, v1.id);
        assert_eq!(restored.reload, dir.path().join("doc.blend"));
        assert_eq!(fs::read(dir.path().join("doc.blend")).unwrap(), b"scene v1");
        assert_eq!(fs::read(dir.path().join("textures/a.png")).unwrap(), b"pixels");

        // Restoring does not rewrite history.
        assert_eq!(vault.load_version(&doc).unwrap().revisions().len(), 2);
    }

    #[test]
    fn test_restore_recreates_deleted_reference() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let vault = vault();

        let v1 = vault.save_version(&mut doc, "v1").unwrap().revision;
        fs::remove_file(dir.path().join("textures/a.png")).unwrap();

        vault.apply_version(&doc, &v1.id).unwrap();
        assert_eq!(fs::read(dir.path().join("textures/a.png")).unwrap(), b"pixels");
    }

    #[test]
    fn test_apply_rejects_option_like_ids() {
        let dir = TempDir::new().unwrap();
        let doc = scene(&dir);
        let err = vault().apply_version(&doc, &RevisionId::new("--orphan")).unwrap_err();
        assert!(matches!(err, VaultError::InvalidRevision(_)));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_apply_unknown_revision_surfaces_backend_error() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let vault = vault();
        vault.save_version(&mut doc, "v1").unwrap();

        let err = vault
            .apply_version(&doc, &RevisionId::new("0000000000000000000000000000000000000000"))
            .unwrap_err();
        match err {
            VaultError::Backend(BackendError::Command { exit_code, stderr, .. }) => {
                assert!(exit_code.is_some());
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read(dir.path().join("doc.blend")).unwrap(), b"scene v1");
    }

    #[test]
    fn test_shared_path_linked_once() {
        let dir = TempDir::new().unwrap();
        write(&dir, "doc.blend", b"scene");
        write(&dir, "textures/wood.png", b"grain");
        write(&dir, "osl/varnish.osl", b"shader");

        let manifest = Manifest {
            images: vec![
                Asset::new("wood", "//textures/wood.png"),
                Asset::new("wood.001", "//textures/wood.png"),
            ],
            materials: vec![NodeHost {
                name: "Floor".into(),
                node_tree: Some(NodeTree::new(vec![Node::Script {
                    filepath: "//osl/varnish.osl".into(),
                    mode: SourceMode::External,
                }])),
            }],
            ..Default::default()
        };
        let mut doc = ManifestDocument::new(dir.path().join("doc.blend")).with_manifest(manifest);

        let outcome = vault().save_version(&mut doc, "shared").unwrap();
        let captured: Vec<_> = outcome.references.iter().map(|r| r.relative_path.clone()).collect();
        assert_eq!(captured, vec![PathBuf::from("textures/wood.png"), PathBuf::from("osl/varnish.osl")]);

        let repo = open_repo(&dir);
        let tree = repo.find_tree(tree_of(&repo, &outcome.revision.id)).unwrap();
        assert!(tree.get_path(Path::new("osl/varnish.osl")).is_ok());
        let textures = tree.get_path(Path::new("textures")).unwrap().to_object(&repo).unwrap();
        assert_eq!(textures.as_tree().unwrap().len(), 1);
    }

    #[test]
    fn test_references_exclude_bookkeeping_directories() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest {
            images: vec![
                Asset::new("repo", "//.doc.blend.git/HEAD"),
                Asset::new("staging", "//doc.blend.work/x.png"),
                Asset::new("self", "//doc.blend"),
                Asset::new("fine", "//fine.png"),
            ],
            ..Default::default()
        };
        let doc = ManifestDocument::new(dir.path().join("doc.blend")).with_manifest(manifest);

        let refs = vault().references(&doc).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].relative_path, PathBuf::from("fine.png"));
    }

    #[test]
    fn test_missing_referenced_file_fails_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        write(&dir, "doc.blend", b"scene");
        let manifest = Manifest {
            sounds: vec![Asset::new("gone", "//sfx/gone.wav")],
            ..Default::default()
        };
        let mut doc = ManifestDocument::new(dir.path().join("doc.blend")).with_manifest(manifest);
        let vault = vault();

        let err = vault.save_version(&mut doc, "broken").unwrap_err();
        assert!(matches!(err, VaultError::Filesystem { .. }));
        assert!(!dir.path().join("doc.blend.work").exists());
        assert_eq!(vault.load_version(&doc).unwrap(), History::Empty);
    }

    #[test]
    fn test_stale_staging_tree_tolerated() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        write(&dir, "doc.blend.work/junk.txt", b"left over from a crash");

        let outcome = vault().save_version(&mut doc, "after crash").unwrap();
        assert!(!dir.path().join("doc.blend.work").exists());

        let repo = open_repo(&dir);
        let tree = repo.find_tree(tree_of(&repo, &outcome.revision.id)).unwrap();
        assert!(tree.get_path(Path::new("junk.txt")).is_err());
    }

    #[test]
    fn test_visible_repository() {
        let dir = TempDir::new().unwrap();
        let mut doc = scene(&dir);
        let vault = Vault::new(
            VaultConfig::new()
                .hide_repository(false)
                .signature(Signature::new("Test", "test@example.com")),
        );

        vault.save_version(&mut doc, "plain").unwrap();
        assert!(dir.path().join("doc.blend.git").is_dir());
        assert!(!dir.path().join(".doc.blend.git").exists());
        assert_eq!(vault.load_version(&doc).unwrap().revisions().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_add_failure_still_removes_staging_tree() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        let fake_git = bin.path().join("git");
        fs::write(
            &fake_git,
            "#!/bin/sh\nif [ \"$1\" = add ]; then echo 'simulated add failure' >&2; exit 3; fi\nexec git \"$@\"\n",
        )
        .unwrap();
        fs::set_permissions(&fake_git, fs::Permissions::from_mode(0o755)).unwrap();

        let mut doc = scene(&dir);
        let failing = Vault::new(
            VaultConfig::new()
                .git_program(&fake_git)
                .signature(Signature::new("Test", "test@example.com")),
        );

        let err = failing.save_version(&mut doc, "v1").unwrap_err();
        match &err {
            VaultError::Backend(e) => {
                assert_eq!(e.exit_code(), Some(3));
                assert!(e.stderr().unwrap().contains("simulated add failure"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("doc.blend.work").exists());

        // The repository was initialised but holds no revision.
        assert!(dir.path().join(".doc.blend.git").is_dir());
        assert_eq!(vault().load_version(&doc).unwrap(), History::Empty);

        // A later save against the real backend succeeds.
        vault().save_version(&mut doc, "v1").unwrap();
        assert_eq!(vault().load_version(&doc).unwrap().revisions().len(), 1);
    }
}
