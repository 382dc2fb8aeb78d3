//! Vault configuration.

use std::path::PathBuf;

use crate::backend::Signature;

/// Configuration options for a [`Vault`](crate::vault::Vault).
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Backend executable.
    pub git_program: PathBuf,
    /// Keep the repository directory hidden.
    pub hide_repository: bool,
    /// Identity for new revisions; `None` leaves it to the backend's own
    /// configuration.
    pub signature: Option<Signature>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            git_program: PathBuf::from("git"),
            hide_repository: true,
            signature: None,
        }
    }
}

impl VaultConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend executable.
    pub fn git_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.git_program = program.into();
        self
    }

    /// Set hide_repository flag.
    pub fn hide_repository(mut self, value: bool) -> Self {
        self.hide_repository = value;
        self
    }

    /// Record new revisions under this identity.
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }
}
