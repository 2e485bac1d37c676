use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// An uploaded blob sitting in the staging directory, not yet committed.
///
/// The filesystem is the source of truth: this is a snapshot taken when the
/// entry was looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    pub id: String,
    /// `{id}_{original_name}`
    pub stored_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

impl StagedFile {
    /// Original upload name, without the id prefix
    pub fn original_name(&self) -> &str {
        self.stored_name
            .strip_prefix(self.id.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(&self.stored_name)
    }

    /// Whether this entry is strictly older than `now - ttl`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        is_older_than(self.modified_at, ttl, now)
    }
}

/// `true` when `modified_at` lies strictly before `now - ttl`.
///
/// A TTL too large to represent never expires anything.
pub fn is_older_than(modified_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl))
        .map(|cutoff| modified_at < cutoff)
        .unwrap_or(false)
}

/// Lifecycle of a staged upload: `Staged -> Promoted` or `Staged -> Expired`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StagedFileState {
    Staged(StagedFile),
    Promoted { id: String, permanent_path: PathBuf },
    Expired { id: String },
}

impl StagedFileState {
    pub fn id(&self) -> &str {
        match self {
            StagedFileState::Staged(file) => &file.id,
            StagedFileState::Promoted { id, .. } | StagedFileState::Expired { id } => id,
        }
    }

    /// Only a staged file can still be analyzed or promoted
    pub fn is_staged(&self) -> bool {
        matches!(self, StagedFileState::Staged(_))
    }
}
