/// Contributor types
use crate::types::{ContributorId, EntryState, PlaylistId, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A non-owner principal granted a role on a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub id: ContributorId,
    pub playlist_id: PlaylistId,
    pub user_id: UserId,
    pub role: Role,
    pub invited_by: UserId,
    pub state: EntryState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contributor {
    /// Whether the grant is currently in force
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Data for granting a role on a playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContributor {
    pub playlist_id: PlaylistId,
    pub user_id: UserId,
    pub role: Role,
    pub invited_by: UserId,
}
