/// Song domain types
use crate::types::{RecordState, SongId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Song metadata record. Audio bytes live in external file storage and are
/// referenced by `file_id` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    /// Length in seconds
    pub duration_secs: u32,
    /// Opaque reference into file storage
    pub file_id: String,
    pub uploaded_by: UserId,
    pub state: RecordState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Whether the song can be added to playlists
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Data for creating a new song
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSong {
    pub title: String,
    pub artist: String,
    pub duration_secs: u32,
    pub file_id: String,
    pub uploaded_by: UserId,
}
