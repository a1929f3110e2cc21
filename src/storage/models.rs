//! Core data models for the commit log
//!
//! These mirror the `commits` table and are independent of how the
//! metadata was gathered.

use serde::{Deserialize, Serialize};

/// Everything recorded about a commit, as produced by the extractor.
///
/// This is a complete row minus the store-assigned `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    /// Fully resolved commit hash (unique key in the store)
    pub commit_hash: String,

    /// Commit time, seconds since the Unix epoch
    pub timestamp: i64,

    /// Absolute path to the repository root when the commit was recorded
    pub repo_path: String,

    /// Full commit message body
    pub commit_message: String,

    pub author_name: String,

    pub author_email: String,

    /// Checked-out branch at record time (None when HEAD was detached)
    pub branch_name: Option<String>,

    /// Number of distinct paths touched by the commit
    pub files_changed: u32,
}

/// A row of the `commits` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Store-assigned ordinal, never reused
    pub id: i64,

    #[serde(flatten)]
    pub metadata: CommitMetadata,

    /// When the row was inserted, seconds since the Unix epoch
    pub created_at: i64,
}

/// Result of an insert-or-ignore into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same commit hash already existed; nothing changed.
    AlreadyPresent,
}

impl std::fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsertOutcome::Inserted => write!(f, "inserted"),
            InsertOutcome::AlreadyPresent => write!(f, "already present"),
        }
    }
}
