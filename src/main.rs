//! docsnap command-line entry point.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use env_logger::Env;
use log::info;

use docsnap::backend::RevisionId;
use docsnap::cli::{Cli, Commands};
use docsnap::document::ManifestDocument;
use docsnap::snapshot::History;
use docsnap::vault::{Picker, Vault};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = match cli.log_level {
        Some(ref log_level) => Env::default().filter_or("RUST_LOG", log_level),
        None => Env::default().filter_or("RUST_LOG", "warn"),
    };
    env_logger::init_from_env(env);

    let vault = Vault::new(cli.vault_config());

    match cli.command {
        Commands::Save {
            document,
            message,
            manifest,
        } => cmd_save(&vault, document, &message, manifest)?,
        Commands::Log { document, json } => cmd_log(&vault, document, json)?,
        Commands::Restore { document, revision, yes } => cmd_restore(&vault, document, &revision, yes)?,
        Commands::Pick { document, manifest } => {
            let mut doc = open_document(document, manifest)?;
            let stdin = io::stdin();
            Picker::new(&vault).run(&mut doc, stdin.lock(), io::stdout())?;
        }
        Commands::Refs {
            document,
            manifest,
            json,
        } => cmd_refs(&vault, document, manifest, json)?,
    }

    Ok(())
}

fn open_document(document: PathBuf, manifest: Option<PathBuf>) -> Result<ManifestDocument> {
    if !document.is_file() {
        return Err(anyhow::anyhow!("Document does not exist: {:?}", document));
    }
    match manifest {
        Some(manifest) => ManifestDocument::open(document, &manifest)
            .with_context(|| format!("Failed to read manifest {}", manifest.display())),
        None => Ok(ManifestDocument::new(document)),
    }
}

fn cmd_save(vault: &Vault, document: PathBuf, message: &str, manifest: Option<PathBuf>) -> Result<()> {
    let mut doc = open_document(document, manifest)?;
    let outcome = vault.save_version(&mut doc, message)?;

    info!("saved {} with {} reference(s)", outcome.revision.id, outcome.references.len());
    println!("{} {}", outcome.revision.id.short(), outcome.revision.message);
    Ok(())
}

fn cmd_log(vault: &Vault, document: PathBuf, json: bool) -> Result<()> {
    let doc = ManifestDocument::new(document);
    let history = vault.load_version(&doc)?;

    let entries = history.entries(Utc::now(), &Local);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    match history {
        History::Empty => println!("{}", docsnap::snapshot::NO_HISTORY_LABEL),
        History::Revisions(ref revisions) => {
            for (revision, entry) in revisions.iter().zip(&entries) {
                println!("{}  {}", revision.id.short(), entry.label);
            }
        }
    }
    Ok(())
}

fn cmd_restore(vault: &Vault, document: PathBuf, revision: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&document, revision)? {
        println!("Nothing restored.");
        return Ok(());
    }
    let doc = open_document(document, None)?;

    let restored = vault.apply_version(&doc, &RevisionId::new(revision))?;
    println!("Restored {}; reload {}", restored.revision.short(), restored.reload.display());
    Ok(())
}

fn cmd_refs(vault: &Vault, document: PathBuf, manifest: PathBuf, json: bool) -> Result<()> {
    let doc = open_document(document, Some(manifest))?;
    let references = vault.references(&doc)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&references)?);
        return Ok(());
    }
    for reference in &references {
        println!("{:<12} {}", reference.kind, reference.relative_path.display());
    }
    Ok(())
}

fn confirm(document: &Path, revision: &str) -> Result<bool> {
    print!(
        "Discard current files next to {} and restore {}? [y/N] ",
        document.display(),
        revision
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
