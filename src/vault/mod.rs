//! High-level versioning API and interactive picker.
//!
//! [`Vault`] exposes the three caller-facing operations: save a version,
//! list versions, apply a version. Any front end (the bundled CLI, a GUI
//! dialog, a script) drives those.

mod api;
mod config;
mod error;
mod picker;

pub use api::{Restored, SaveOutcome, Vault};
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use picker::{Picker, PickerConfig};
