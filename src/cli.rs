//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::backend::Signature;
use crate::vault::VaultConfig;

/// docsnap - keep versions of a document and the files it references
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Git executable to run
    #[arg(long, value_name = "PROGRAM", default_value = "git", global = true)]
    pub git: PathBuf,

    /// Keep the repository directory visible
    #[arg(long, global = true)]
    pub no_hide: bool,

    /// Author name for new versions (defaults to git's own configuration)
    #[arg(long, value_name = "NAME", requires = "author_email", global = true)]
    pub author_name: Option<String>,

    /// Author email for new versions
    #[arg(long, value_name = "EMAIL", requires = "author_name", global = true)]
    pub author_email: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save the document and its referenced files as a new version
    Save {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Version message
        #[arg(long, short)]
        message: String,

        /// JSON manifest listing the document's references
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },

    /// List saved versions, newest first
    Log {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore the document directory to a saved version
    ///
    /// Files tracked by the version are overwritten. Local edits to them
    /// are lost.
    Restore {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Revision id as printed by `docsnap log`
        #[arg(value_name = "REVISION")]
        revision: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Choose a version to restore interactively
    Pick {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// JSON manifest to reload after restoring
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },

    /// Show the referenced files a save would capture
    Refs {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// JSON manifest listing the document's references
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Vault configuration from the global flags.
    pub fn vault_config(&self) -> VaultConfig {
        let config = VaultConfig::new()
            .git_program(&self.git)
            .hide_repository(!self.no_hide);
        match (&self.author_name, &self.author_email) {
            (Some(name), Some(email)) => config.signature(Signature::new(name.clone(), email.clone())),
            _ => config,
        }
    }
}
