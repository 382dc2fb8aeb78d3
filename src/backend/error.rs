//! Backend adapter error types.

use thiserror::Error;

/// Errors from invoking the version-control backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// the backend program could not be started at all
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// the backend ran and exited unsuccessfully
    #[error("`{command}` failed ({}): {}", exit_display(.exit_code), .stderr.trim())]
    Command {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// a history line did not have the expected shape
    #[error("malformed history line: {line:?}")]
    MalformedHistory { line: String },

    /// backend output was expected to be text
    #[error("backend output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn exit_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl BackendError {
    /// exit code of a failed command, if the process exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BackendError::Command { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// the backend's own diagnostic text, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            BackendError::Command { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
