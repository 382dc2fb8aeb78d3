//! Git command-line adapter.
//!
//! Every operation spawns exactly one `git` process, synchronously, with
//! stdin closed. Two modes decide where the process runs and how it finds
//! the repository:
//!
//! - [`Mode::Read`]: working directory is the document's directory and the
//!   repository is named explicitly through `GIT_DIR`.
//! - [`Mode::Write`]: working directory is the staging tree and `GIT_DIR` is
//!   removed from the environment. Git finds the repository through the
//!   staging tree's `.git` link; an explicit `GIT_DIR` would make it treat the
//!   repository as bare and refuse to commit a working tree.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::history::{parse_history, HISTORY_FORMAT};
use crate::backend::types::{Revision, RevisionId, Signature};
use crate::repo::RepoLayout;

/// Exit code `git config --unset` uses when the key is not present.
const CONFIG_KEY_ABSENT: i32 = 5;

/// Exit code `git rev-parse --verify --quiet` uses when the ref is missing.
const REF_ABSENT: i32 = 1;

/// Where a backend command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Against the document directory, for history and restore.
    Read,
    /// Inside the staging tree, for init, config, add and commit.
    Write,
}

/// Runs git commands on behalf of one document.
#[derive(Debug, Clone)]
pub struct GitBackend {
    program: PathBuf,
    layout: RepoLayout,
    signature: Option<Signature>,
}

impl GitBackend {
    pub fn new(program: impl Into<PathBuf>, layout: RepoLayout) -> Self {
        Self {
            program: program.into(),
            layout,
            signature: None,
        }
    }

    /// Identity to record on commits made in write mode.
    pub fn with_signature(mut self, signature: Option<Signature>) -> Self {
        self.signature = signature;
        self
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    /// Run one git command and return its standard output.
    pub fn run<I, S>(&self, mode: Mode, args: I) -> BackendResult<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .env_remove("GIT_WORK_TREE")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match mode {
            Mode::Read => {
                command
                    .current_dir(self.layout.parent())
                    .env("GIT_DIR", self.layout.repository());
            }
            Mode::Write => {
                command
                    .current_dir(self.layout.staging())
                    .env_remove("GIT_DIR");
                if let Some(sig) = &self.signature {
                    command
                        .env("GIT_AUTHOR_NAME", &sig.name)
                        .env("GIT_AUTHOR_EMAIL", &sig.email)
                        .env("GIT_COMMITTER_NAME", &sig.name)
                        .env("GIT_COMMITTER_EMAIL", &sig.email);
                }
            }
        }

        debug!("{:?} mode: {}", mode, render(&self.program, &args));
        execute(command, &self.program, &args)
    }

    /// Create the repository through the staging tree's link.
    pub fn init(&self) -> BackendResult<()> {
        self.run(Mode::Write, ["init", "--quiet"])?;
        Ok(())
    }

    /// Remove a configuration key. Returns `false` if it was not set.
    pub fn unset_config(&self, key: &str) -> BackendResult<bool> {
        match self.run(Mode::Write, ["config", "--unset", key]) {
            Ok(_) => Ok(true),
            Err(e) if e.exit_code() == Some(CONFIG_KEY_ABSENT) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Stage one path relative to the staging tree.
    ///
    /// An unchanged file is a successful no-op.
    pub fn add(&self, path: &Path) -> BackendResult<()> {
        let args = [OsStr::new("add"), OsStr::new("--"), path.as_os_str()];
        self.run(Mode::Write, args)?;
        Ok(())
    }

    /// Record the staged tree as a new revision.
    ///
    /// Empty commits are allowed so that saving an unchanged document still
    /// produces a revision.
    pub fn commit(&self, message: &str) -> BackendResult<()> {
        self.run(Mode::Write, ["commit", "--quiet", "--allow-empty", "-m", message])?;
        Ok(())
    }

    /// Overwrite tracked files in the document directory with their content
    /// at `revision`, discarding local modifications.
    pub fn checkout_force(&self, revision: &RevisionId, paths: &[&Path]) -> BackendResult<()> {
        let mut args = vec![
            OsStr::new("checkout"),
            OsStr::new("-f"),
            OsStr::new(revision.as_str()),
            OsStr::new("--"),
        ];
        if paths.is_empty() {
            args.push(OsStr::new("."));
        } else {
            args.extend(paths.iter().map(|p| p.as_os_str()));
        }
        self.run(Mode::Read, args)?;
        Ok(())
    }

    /// History, newest first.
    pub fn log(&self, mode: Mode, limit: Option<usize>) -> BackendResult<Vec<Revision>> {
        let mut args = vec!["log".to_string(), HISTORY_FORMAT.to_string()];
        if let Some(n) = limit {
            args.push(format!("--max-count={}", n));
        }
        let output = String::from_utf8(self.run(mode, &args)?)?;
        parse_history(&output)
    }

    /// Whether the repository has at least one revision.
    pub fn has_revisions(&self) -> BackendResult<bool> {
        match self.run(Mode::Read, ["rev-parse", "--verify", "--quiet", "HEAD"]) {
            Ok(_) => Ok(true),
            Err(e) if e.exit_code() == Some(REF_ABSENT) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Mark the repository directory hidden with the platform attribute tool.
    #[cfg(windows)]
    pub fn hide_repository(&self) -> BackendResult<()> {
        let program = PathBuf::from("attrib");
        let args = vec![OsString::from("+h"), self.layout.repository().as_os_str().to_os_string()];

        let mut command = Command::new(&program);
        command
            .args(&args)
            .current_dir(self.layout.parent())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("hide: {}", render(&program, &args));
        execute(command, &program, &args)?;
        Ok(())
    }

    /// Dot-prefixed names are already hidden here.
    #[cfg(not(windows))]
    pub fn hide_repository(&self) -> BackendResult<()> {
        Ok(())
    }
}

fn execute(mut command: Command, program: &Path, args: &[OsString]) -> BackendResult<Vec<u8>> {
    let output = command.output().map_err(|source| BackendError::Spawn {
        program: program.display().to_string(),
        source,
    })?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(BackendError::Command {
            command: render(program, args),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn render(program: &Path, args: &[OsString]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
