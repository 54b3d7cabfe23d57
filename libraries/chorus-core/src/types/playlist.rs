/// Playlist domain types
use crate::types::{PlaylistId, RecordState, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist title
    pub title: String,

    /// Free-form description (may be empty)
    pub description: String,

    /// Owner, fixed at creation
    pub owner_id: UserId,

    /// Whether anyone may read the playlist
    pub is_public: bool,

    /// Lifecycle state
    pub state: RecordState,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Whether `user_id` owns this playlist
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Whether the playlist has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        !self.state.is_active()
    }
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylist {
    pub title: String,
    pub description: String,
    pub owner_id: UserId,
    pub is_public: bool,
}

/// Partial update of playlist metadata; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylist {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl UpdatePlaylist {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_public.is_none()
    }
}
