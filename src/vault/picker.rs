//! Interactive version picker.
//!
//! Lists a document's revisions, reads a choice and a confirmation, then
//! restores the chosen revision and reloads the document handle.

use std::io::{BufRead, Write};

use chrono::{Local, Utc};

use super::api::{Restored, Vault};
use super::error::VaultResult;
use crate::backend::RevisionId;
use crate::document::DocumentModel;
use crate::snapshot::HistoryEntry;

/// Picker configuration.
#[derive(Debug, Clone)]
pub struct PickerConfig {
    /// Prompt shown before reading a choice.
    pub prompt: String,
    /// Ask before overwriting the working files.
    pub confirm: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            prompt: "version> ".into(),
            confirm: true,
        }
    }
}

/// Line-oriented picker over any reader and writer.
pub struct Picker<'v> {
    vault: &'v Vault,
    config: PickerConfig,
}

impl<'v> Picker<'v> {
    pub fn new(vault: &'v Vault) -> Self {
        Self {
            vault,
            config: PickerConfig::default(),
        }
    }

    pub fn with_config(vault: &'v Vault, config: PickerConfig) -> Self {
        Self { vault, config }
    }

    /// Run until a revision is restored or the user gives up.
    pub fn run<D, R, W>(&self, doc: &mut D, mut input: R, mut output: W) -> VaultResult<Option<Restored>>
    where
        D: DocumentModel + ?Sized,
        R: BufRead,
        W: Write,
    {
        let history = self.vault.load_version(&*doc)?;
        let entries = history.entries(Utc::now(), &Local);
        if history.is_empty() {
            for entry in &entries {
                writeln!(output, "{}", entry.label)?;
            }
            return Ok(None);
        }

        print_entries(&mut output, &entries)?;

        let entry = loop {
            write!(output, "{}", self.config.prompt)?;
            output.flush()?;

            let Some(line) = read_line(&mut input)? else {
                writeln!(output)?;
                return Ok(None);
            };

            match line.as_str() {
                "" | "q" | "quit" => return Ok(None),
                "l" | "list" => print_entries(&mut output, &entries)?,
                choice => match choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| entries.get(i)) {
                    Some(entry) => break entry,
                    None => writeln!(output, "Not a choice: {} (1-{}, q to quit)", choice, entries.len())?,
                },
            }
        };

        if self.config.confirm {
            write!(output, "Discard current files and restore \"{}\"? [y/N] ", entry.label)?;
            output.flush()?;
            let answer = read_line(&mut input)?.unwrap_or_default().to_lowercase();
            if answer != "y" && answer != "yes" {
                writeln!(output, "Nothing restored.")?;
                return Ok(None);
            }
        }

        let restored = self.vault.apply_version(&*doc, &RevisionId::new(entry.id.as_str()))?;
        doc.reload()?;
        writeln!(output, "Restored {}; reload {}", restored.revision.short(), restored.reload.display())?;
        Ok(Some(restored))
    }
}

fn print_entries<W: Write>(output: &mut W, entries: &[HistoryEntry]) -> std::io::Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        writeln!(output, "{:>3}) {}", i + 1, entry.label)?;
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Signature;
    use crate::document::ManifestDocument;
    use crate::vault::config::VaultConfig;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Vault, ManifestDocument) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("doc.blend"), b"one").unwrap();
        let vault = Vault::new(VaultConfig::new().signature(Signature::new("Test", "test@example.com")));
        let doc = ManifestDocument::new(dir.path().join("doc.blend"));
        (dir, vault, doc)
    }

    fn run(vault: &Vault, doc: &mut ManifestDocument, input: &str) -> (Option<Restored>, String) {
        let mut output = Vec::new();
        let result = Picker::new(vault).run(doc, Cursor::new(input.as_bytes()), &mut output).unwrap();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_no_history() {
        let (_dir, vault, mut doc) = setup();
        let (result, output) = run(&vault, &mut doc, "1\n");
        assert!(result.is_none());
        assert_eq!(output.trim(), "No repo found");
    }

    #[test]
    fn test_pick_and_confirm() {
        let (dir, vault, mut doc) = setup();
        vault.save_version(&mut doc, "one").unwrap();
        fs::write(dir.path().join("doc.blend"), b"two").unwrap();
        vault.save_version(&mut doc, "two").unwrap();

        // Newest first: entry 2 is "one".
        let (result, output) = run(&vault, &mut doc, "7\n2\ny\n");
        assert!(output.contains("Not a choice: 7"));
        assert!(output.contains("  1) "));
        assert!(result.is_some());
        assert_eq!(fs::read(dir.path().join("doc.blend")).unwrap(), b"one");
    }

    #[test]
    fn test_declined_confirmation_changes_nothing() {
        let (dir, vault, mut doc) = setup();
        vault.save_version(&mut doc, "one").unwrap();
        fs::write(dir.path().join("doc.blend"), b"unsaved edits").unwrap();

        let (result, output) = run(&vault, &mut doc, "1\nn\n");
        assert!(result.is_none());
        assert!(output.contains("Nothing restored."));
        assert_eq!(fs::read(dir.path().join("doc.blend")).unwrap(), b"unsaved edits");
    }

    #[test]
    fn test_quit_and_eof() {
        let (_dir, vault, mut doc) = setup();
        vault.save_version(&mut doc, "one").unwrap();

        assert!(run(&vault, &mut doc, "q\n").0.is_none());
        assert!(run(&vault, &mut doc, "").0.is_none());
    }
}
