//! Revision history as presented to a caller choosing what to restore.

use std::fmt::Display;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::backend::Revision;

/// Label of the single entry shown when there is nothing to restore.
pub const NO_HISTORY_LABEL: &str = "No repo found";

const SECONDS_PER_DAY: i64 = 86_400;

/// The revisions of a document, or the absence of any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum History {
    /// No repository yet, or one without revisions.
    Empty,
    /// Newest first.
    Revisions(Vec<Revision>),
}

/// One selectable line: the id to restore and its display label.
///
/// The [`History::Empty`] sentinel renders as an entry with an empty id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub label: String,
}

impl History {
    pub fn is_empty(&self) -> bool {
        match self {
            History::Empty => true,
            History::Revisions(revisions) => revisions.is_empty(),
        }
    }

    pub fn revisions(&self) -> &[Revision] {
        match self {
            History::Empty => &[],
            History::Revisions(revisions) => revisions,
        }
    }

    /// Entries ready for display, with times rendered in `tz` relative to `now`.
    pub fn entries<Tz>(&self, now: DateTime<Utc>, tz: &Tz) -> Vec<HistoryEntry>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if self.is_empty() {
            return vec![HistoryEntry {
                id: String::new(),
                label: NO_HISTORY_LABEL.to_string(),
            }];
        }
        self.revisions()
            .iter()
            .map(|revision| HistoryEntry {
                id: revision.id.to_string(),
                label: label(revision, now, tz),
            })
            .collect()
    }
}

/// `"<compact time>: <message>"`.
pub fn label<Tz>(revision: &Revision, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}: {}", compact_timestamp(revision.timestamp, now, tz), revision.message)
}

/// As brief a rendering of `at` as still reads unambiguously from `now`.
///
/// Within a day: `13:05:09`. Otherwise `Mar-04 13:05`, with the year in
/// front when it is not the current one.
pub fn compact_timestamp<Tz>(at: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = at.with_timezone(tz);
    if (now - at).num_seconds().abs() < SECONDS_PER_DAY {
        return local.format("%H:%M:%S").to_string();
    }

    let current_year = now.with_timezone(tz).year();
    if local.year() != current_year {
        local.format("%Y %b-%d %H:%M").to_string()
    } else {
        local.format("%b-%d %H:%M").to_string()
    }
}
