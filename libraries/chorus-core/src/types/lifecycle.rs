/// Lifecycle states for soft-deletable records
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of join rows (playlist entries, contributors).
///
/// A `Removed` row keeps its slot: re-adding the same pair revives it
/// instead of inserting a second row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Visible member of the collection
    Active,
    /// Soft-removed, eligible for revival
    Removed,
}

impl EntryState {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Active => "active",
            EntryState::Removed => "removed",
        }
    }

    /// Whether the row is active
    pub fn is_active(&self) -> bool {
        matches!(self, EntryState::Active)
    }
}

impl FromStr for EntryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntryState::Active),
            "removed" => Ok(EntryState::Removed),
            other => Err(format!("unknown entry state '{other}'")),
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of top-level records (users, songs, playlists)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Live record
    Active,
    /// Soft-deleted; treated as absent by every read
    SoftDeleted,
}

impl RecordState {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::Active => "active",
            RecordState::SoftDeleted => "soft_deleted",
        }
    }

    /// Whether the record is live
    pub fn is_active(&self) -> bool {
        matches!(self, RecordState::Active)
    }
}

impl FromStr for RecordState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecordState::Active),
            "soft_deleted" => Ok(RecordState::SoftDeleted),
            other => Err(format!("unknown record state '{other}'")),
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
