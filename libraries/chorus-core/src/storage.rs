//! Collection store trait
//!
//! The durable document store is an external collaborator. This trait is the
//! narrow slice of it that Chorus consumes: filtered finds, creates, updates
//! and soft-deletes per collection. Each method is a single atomic write or
//! read against the store; no method spans collections.

use crate::error::Result;
use crate::types::{
    Contributor, ContributorId, CreatePlaylist, CreateSong, CreateUser, EntryId, NewContributor,
    Playlist, PlaylistEntry, PlaylistId, Role, Song, SongId, UpdatePlaylist, User, UserId,
};
use async_trait::async_trait;

/// Storage operations over the Chorus collections
#[async_trait]
pub trait CollectionStore: Send + Sync {
    // ========================================================================
    // Users
    // ========================================================================

    /// Create a new user
    async fn create_user(&self, user: CreateUser) -> Result<User>;

    /// Get user by ID, whatever its lifecycle state
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get all active users
    async fn get_all_users(&self) -> Result<Vec<User>>;

    // ========================================================================
    // Songs
    // ========================================================================

    /// Create a new song record
    async fn create_song(&self, song: CreateSong) -> Result<Song>;

    /// Get song by ID, whatever its lifecycle state
    async fn get_song(&self, id: &SongId) -> Result<Option<Song>>;

    /// Get all active songs
    async fn get_all_songs(&self) -> Result<Vec<Song>>;

    // ========================================================================
    // Playlists
    // ========================================================================

    /// Create a new playlist
    async fn create_playlist(&self, playlist: CreatePlaylist) -> Result<Playlist>;

    /// Get playlist by ID, whatever its lifecycle state
    async fn get_playlist(&self, id: &PlaylistId) -> Result<Option<Playlist>>;

    /// Get all non-deleted playlists
    async fn get_playlists(&self) -> Result<Vec<Playlist>>;

    /// Get non-deleted playlists owned by `owner_id`
    async fn get_playlists_by_owner(&self, owner_id: &UserId) -> Result<Vec<Playlist>>;

    /// Get non-deleted public playlists
    async fn get_public_playlists(&self) -> Result<Vec<Playlist>>;

    /// IDs of playlists where `user_id` holds an active contributor row
    async fn get_contributed_playlist_ids(&self, user_id: &UserId) -> Result<Vec<PlaylistId>>;

    /// Apply a metadata patch; fails with `NotFound` for unknown or deleted playlists
    async fn update_playlist(&self, id: &PlaylistId, patch: UpdatePlaylist) -> Result<Playlist>;

    /// Mark a playlist soft-deleted
    async fn soft_delete_playlist(&self, id: &PlaylistId) -> Result<Playlist>;

    // ========================================================================
    // Playlist entries
    // ========================================================================

    /// Find the entry for a (playlist, song) pair, whatever its lifecycle state
    async fn find_entry(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<Option<PlaylistEntry>>;

    /// Insert a fresh active entry with `order` = highest active order + 1
    /// (0 when there is none), computed in the same write.
    ///
    /// Fails with `Conflict` if a row for the pair already exists.
    async fn append_entry(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
        added_by: &UserId,
    ) -> Result<PlaylistEntry>;

    /// Flip a removed entry back to active, reassigning `order` with the same
    /// rule as [`CollectionStore::append_entry`] and updating `added_by`
    async fn revive_entry(&self, id: &EntryId, added_by: &UserId) -> Result<PlaylistEntry>;

    /// Mark an entry removed; remaining orders are not renumbered
    async fn remove_entry(&self, id: &EntryId) -> Result<PlaylistEntry>;

    /// Set `order` for each listed song's active entry. Songs without an
    /// active entry are skipped. Returns the number of entries updated.
    async fn set_entry_orders(
        &self,
        playlist_id: &PlaylistId,
        orders: &[(SongId, u32)],
    ) -> Result<u64>;

    /// Active entries of a playlist sorted ascending by `order`
    async fn get_active_entries(&self, playlist_id: &PlaylistId) -> Result<Vec<PlaylistEntry>>;

    // ========================================================================
    // Contributors
    // ========================================================================

    /// Find the contributor row for a (playlist, user) pair, whatever its state
    async fn find_contributor(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<Option<Contributor>>;

    /// Insert a fresh active contributor row
    async fn insert_contributor(&self, contributor: NewContributor) -> Result<Contributor>;

    /// Flip a removed contributor row back to active with a new role and inviter
    async fn revive_contributor(
        &self,
        id: &ContributorId,
        role: Role,
        invited_by: &UserId,
    ) -> Result<Contributor>;

    /// Change the role of a contributor row
    async fn update_contributor_role(&self, id: &ContributorId, role: Role)
        -> Result<Contributor>;

    /// Mark a contributor row removed
    async fn remove_contributor(&self, id: &ContributorId) -> Result<Contributor>;

    /// Active contributors of a playlist
    async fn get_active_contributors(&self, playlist_id: &PlaylistId)
        -> Result<Vec<Contributor>>;
}
