//! Parsing of the backend's line-oriented history output.
//!
//! Each line is `<id> <epoch seconds> <subject>`. Only the first two spaces
//! separate fields; the subject keeps any spaces it contains.

use chrono::{TimeZone, Utc};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::types::{Revision, RevisionId};

/// Format string passed to the backend's history query.
pub const HISTORY_FORMAT: &str = "--format=%H %ct %s";

/// Parse history output, newest first as the backend emits it.
pub fn parse_history(output: &str) -> BackendResult<Vec<Revision>> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> BackendResult<Revision> {
    let malformed = || BackendError::MalformedHistory {
        line: line.to_string(),
    };

    let mut fields = line.splitn(3, ' ');
    let id = fields.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
    let epoch: i64 = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(malformed)?;
    let message = fields.next().unwrap_or_default();

    let timestamp = Utc.timestamp_opt(epoch, 0).single().ok_or_else(malformed)?;

    Ok(Revision {
        id: RevisionId::new(id),
        timestamp,
        message: message.to_string(),
    })
}
