//! Per-operation request types
//!
//! Each user-facing operation has a raw `*Input` (what arrives on the wire,
//! loosely typed) and a validated `*Request` (typed ids, parsed roles,
//! trimmed strings). Only validated requests reach access control and the
//! ledger.

use crate::error::{ChorusError, FieldError, Result};
use crate::types::{PlaylistId, Role, SongId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum playlist title length
pub const MAX_PLAYLIST_TITLE: usize = 100;
/// Maximum playlist description length
pub const MAX_PLAYLIST_DESCRIPTION: usize = 500;
/// Maximum song title length
pub const MAX_SONG_TITLE: usize = 200;
/// Maximum artist name length
pub const MAX_ARTIST: usize = 100;
/// Maximum song duration in seconds
pub const MAX_DURATION_SECS: i64 = 7200;
/// Maximum number of ids accepted by a reorder
pub const MAX_REORDER_IDS: usize = 200;

/// Accumulates field errors across one input
#[derive(Debug, Default)]
struct Violations(Vec<FieldError>);

impl Violations {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Parse a UUID in any accepted form and store it lowercase hyphenated
    fn id<T: From<String>>(&mut self, field: &str, raw: &str) -> Option<T> {
        match uuid::Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(T::from(id.hyphenated().to_string())),
            Err(_) => {
                self.push(field, "Invalid ID format");
                None
            }
        }
    }

    fn text(&mut self, field: &str, raw: &str, min: usize, max: usize, label: &str) -> String {
        let value = raw.trim().to_string();
        let len = value.chars().count();
        if len < min {
            if min == 1 {
                self.push(field, format!("{label} is required"));
            } else {
                self.push(field, format!("{label} must be at least {min} characters"));
            }
        } else if len > max {
            self.push(field, format!("{label} must be at most {max} characters"));
        }
        value
    }

    fn role(&mut self, field: &str, raw: &str) -> Option<Role> {
        match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T> {
        if !self.0.is_empty() {
            return Err(ChorusError::Validation(self.0));
        }
        build().ok_or_else(|| ChorusError::invalid("input", "Invalid input"))
    }
}

// ============================================================================
// Playlists
// ============================================================================

/// Raw `createPlaylist` input
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Validated `createPlaylist` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlaylistRequest {
    pub title: String,
    pub description: String,
    pub is_public: bool,
}

impl CreatePlaylistInput {
    /// Validate and normalize; `isPublic` defaults to `true`
    pub fn validate(self) -> Result<CreatePlaylistRequest> {
        let mut v = Violations::default();
        let title = v.text("title", &self.title, 1, MAX_PLAYLIST_TITLE, "Title");
        let description = v.text(
            "description",
            self.description.as_deref().unwrap_or(""),
            0,
            MAX_PLAYLIST_DESCRIPTION,
            "Description",
        );
        v.finish(|| {
            Some(CreatePlaylistRequest {
                title,
                description,
                is_public: self.is_public.unwrap_or(true),
            })
        })
    }
}

/// Raw `updatePlaylist` patch
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Validated `updatePlaylist` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlaylistRequest {
    pub playlist_id: PlaylistId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl UpdatePlaylistInput {
    /// Validate against the target playlist id; at least one field is required
    pub fn validate(self, playlist_id: &str) -> Result<UpdatePlaylistRequest> {
        let mut v = Violations::default();
        let id = v.id("playlistId", playlist_id);
        if self.title.is_none() && self.description.is_none() && self.is_public.is_none() {
            v.push("input", "At least one field must be provided");
        }
        let title = self
            .title
            .as_deref()
            .map(|t| v.text("title", t, 1, MAX_PLAYLIST_TITLE, "Title"));
        let description = self.description.as_deref().map(|d| {
            v.text("description", d, 0, MAX_PLAYLIST_DESCRIPTION, "Description")
        });
        v.finish(|| {
            Some(UpdatePlaylistRequest {
                playlist_id: id?,
                title,
                description,
                is_public: self.is_public,
            })
        })
    }
}

/// Validate a bare playlist id (fetch, delete, list songs)
pub fn validate_playlist_id(raw: &str) -> Result<PlaylistId> {
    let mut v = Violations::default();
    let id = v.id("playlistId", raw);
    v.finish(|| id)
}

/// Validate a bare user id
pub fn validate_user_id(raw: &str) -> Result<UserId> {
    let mut v = Violations::default();
    let id = v.id("userId", raw);
    v.finish(|| id)
}

/// Validate a bare song id
pub fn validate_song_id(raw: &str) -> Result<SongId> {
    let mut v = Violations::default();
    let id = v.id("songId", raw);
    v.finish(|| id)
}

// ============================================================================
// Playlist songs
// ============================================================================

/// Raw `addSongToPlaylist` / `removeSongFromPlaylist` input
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongInput {
    #[serde(default)]
    pub playlist_id: String,
    #[serde(default)]
    pub song_id: String,
}

/// Validated `addSongToPlaylist` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSongToPlaylistRequest {
    pub playlist_id: PlaylistId,
    pub song_id: SongId,
}

/// Validated `removeSongFromPlaylist` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSongFromPlaylistRequest {
    pub playlist_id: PlaylistId,
    pub song_id: SongId,
}

impl PlaylistSongInput {
    fn ids(&self) -> Result<(PlaylistId, SongId)> {
        let mut v = Violations::default();
        let playlist_id = v.id("playlistId", &self.playlist_id);
        let song_id = v.id("songId", &self.song_id);
        v.finish(|| Some((playlist_id?, song_id?)))
    }

    /// Validate as an add request
    pub fn validate_add(self) -> Result<AddSongToPlaylistRequest> {
        let (playlist_id, song_id) = self.ids()?;
        Ok(AddSongToPlaylistRequest {
            playlist_id,
            song_id,
        })
    }

    /// Validate as a remove request
    pub fn validate_remove(self) -> Result<RemoveSongFromPlaylistRequest> {
        let (playlist_id, song_id) = self.ids()?;
        Ok(RemoveSongFromPlaylistRequest {
            playlist_id,
            song_id,
        })
    }
}

/// Raw `reorderPlaylistSongs` input
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPlaylistSongsInput {
    #[serde(default)]
    pub playlist_id: String,
    #[serde(default)]
    pub song_ids: Vec<String>,
}

/// Validated `reorderPlaylistSongs` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlaylistSongsRequest {
    pub playlist_id: PlaylistId,
    pub song_ids: Vec<SongId>,
}

impl ReorderPlaylistSongsInput {
    /// Validate: 1..=200 well-formed, distinct song ids
    pub fn validate(self) -> Result<ReorderPlaylistSongsRequest> {
        let mut v = Violations::default();
        let playlist_id = v.id("playlistId", &self.playlist_id);

        if self.song_ids.is_empty() {
            v.push("songIds", "At least one song ID is required");
        } else if self.song_ids.len() > MAX_REORDER_IDS {
            v.push("songIds", "Too many song IDs");
        }

        let mut seen = HashSet::new();
        let mut song_ids = Vec::with_capacity(self.song_ids.len());
        for (i, raw) in self.song_ids.iter().enumerate() {
            let field = format!("songIds.{i}");
            if let Some(id) = v.id::<SongId>(&field, raw) {
                if !seen.insert(id.clone()) {
                    v.push(field, "Duplicate song ID");
                }
                song_ids.push(id);
            }
        }

        v.finish(|| {
            Some(ReorderPlaylistSongsRequest {
                playlist_id: playlist_id?,
                song_ids,
            })
        })
    }
}

// ============================================================================
// Contributors
// ============================================================================

/// Raw `addContributor` / `updateContributorRole` input
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorRoleInput {
    #[serde(default)]
    pub playlist_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub role: String,
}

/// Validated `addContributor` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddContributorRequest {
    pub playlist_id: PlaylistId,
    pub user_id: UserId,
    pub role: Role,
}

/// Validated `updateContributorRole` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateContributorRoleRequest {
    pub playlist_id: PlaylistId,
    pub user_id: UserId,
    pub role: Role,
}

impl ContributorRoleInput {
    fn parts(&self) -> Result<(PlaylistId, UserId, Role)> {
        let mut v = Violations::default();
        let playlist_id = v.id("playlistId", &self.playlist_id);
        let user_id = v.id("userId", &self.user_id);
        let role = v.role("role", &self.role);
        v.finish(|| Some((playlist_id?, user_id?, role?)))
    }

    /// Validate as an add request
    pub fn validate_add(self) -> Result<AddContributorRequest> {
        let (playlist_id, user_id, role) = self.parts()?;
        Ok(AddContributorRequest {
            playlist_id,
            user_id,
            role,
        })
    }

    /// Validate as a role update
    pub fn validate_update(self) -> Result<UpdateContributorRoleRequest> {
        let (playlist_id, user_id, role) = self.parts()?;
        Ok(UpdateContributorRoleRequest {
            playlist_id,
            user_id,
            role,
        })
    }
}

/// Validated `removeContributor` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveContributorRequest {
    pub playlist_id: PlaylistId,
    pub user_id: UserId,
}

impl RemoveContributorRequest {
    /// Validate raw path parameters
    pub fn validate(playlist_id: &str, user_id: &str) -> Result<Self> {
        let mut v = Violations::default();
        let playlist_id = v.id("playlistId", playlist_id);
        let user_id = v.id("userId", user_id);
        v.finish(|| {
            Some(Self {
                playlist_id: playlist_id?,
                user_id: user_id?,
            })
        })
    }
}

// ============================================================================
// Songs
// ============================================================================

/// Raw `createSong` input
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSongInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub file_id: String,
}

/// Validated `createSong` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSongRequest {
    pub title: String,
    pub artist: String,
    pub duration_secs: u32,
    pub file_id: String,
}

impl CreateSongInput {
    /// Validate song metadata
    pub fn validate(self) -> Result<CreateSongRequest> {
        let mut v = Violations::default();
        let title = v.text("title", &self.title, 1, MAX_SONG_TITLE, "Title");
        let artist = v.text("artist", &self.artist, 1, MAX_ARTIST, "Artist");
        if self.duration < 1 {
            v.push("duration", "Duration must be at least 1 second");
        } else if self.duration > MAX_DURATION_SECS {
            v.push("duration", "Duration must be at most 2 hours (7200 seconds)");
        }
        let file_id = self.file_id.trim().to_string();
        if file_id.is_empty() {
            v.push("fileId", "File ID is required");
        }
        v.finish(|| {
            Some(CreateSongRequest {
                title,
                artist,
                duration_secs: u32::try_from(self.duration).ok()?,
                file_id,
            })
        })
    }
}
