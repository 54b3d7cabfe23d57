/// Playlist entry (playlist <-> song join) types
use crate::types::{EntryId, EntryState, PlaylistId, SongId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (playlist, song) membership record.
///
/// At most one row exists per (playlist, song) pair for the whole lifetime
/// of the playlist; removal flips `state` and a later add revives the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    /// Unique entry identifier
    pub id: EntryId,

    /// Playlist this entry belongs to
    pub playlist_id: PlaylistId,

    /// Song referenced by this entry
    pub song_id: SongId,

    /// User who (most recently) added the song
    pub added_by: UserId,

    /// Position among active entries (ascending)
    pub order: u32,

    /// Lifecycle state
    pub state: EntryState,

    /// When the row was first created
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl PlaylistEntry {
    /// Whether the entry is part of the active playlist
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
