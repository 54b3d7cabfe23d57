use crate::{contributors, entries, playlists, songs, users};
use async_trait::async_trait;
use chorus_core::{error::Result, storage::CollectionStore, types::*};
use sqlx::SqlitePool;

/// Collection store backed by `SQLite`
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CollectionStore for SqliteStore {
    // Users
    async fn create_user(&self, user: CreateUser) -> Result<User> {
        users::create(&self.pool, user).await
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        users::get_by_id(&self.pool, id).await
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        users::get_all(&self.pool).await
    }

    // Songs
    async fn create_song(&self, song: CreateSong) -> Result<Song> {
        songs::create(&self.pool, song).await
    }

    async fn get_song(&self, id: &SongId) -> Result<Option<Song>> {
        songs::get_by_id(&self.pool, id).await
    }

    async fn get_all_songs(&self) -> Result<Vec<Song>> {
        songs::get_all(&self.pool).await
    }

    // Playlists
    async fn create_playlist(&self, playlist: CreatePlaylist) -> Result<Playlist> {
        playlists::create(&self.pool, playlist).await
    }

    async fn get_playlist(&self, id: &PlaylistId) -> Result<Option<Playlist>> {
        playlists::get_by_id(&self.pool, id).await
    }

    async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        playlists::get_all(&self.pool).await
    }

    async fn get_playlists_by_owner(&self, owner_id: &UserId) -> Result<Vec<Playlist>> {
        playlists::get_by_owner(&self.pool, owner_id).await
    }

    async fn get_public_playlists(&self) -> Result<Vec<Playlist>> {
        playlists::get_public(&self.pool).await
    }

    async fn get_contributed_playlist_ids(&self, user_id: &UserId) -> Result<Vec<PlaylistId>> {
        contributors::get_playlist_ids_for_user(&self.pool, user_id).await
    }

    async fn update_playlist(&self, id: &PlaylistId, patch: UpdatePlaylist) -> Result<Playlist> {
        playlists::update(&self.pool, id, patch).await
    }

    async fn soft_delete_playlist(&self, id: &PlaylistId) -> Result<Playlist> {
        playlists::soft_delete(&self.pool, id).await
    }

    // Entries
    async fn find_entry(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<Option<PlaylistEntry>> {
        entries::find(&self.pool, playlist_id, song_id).await
    }

    async fn append_entry(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
        added_by: &UserId,
    ) -> Result<PlaylistEntry> {
        entries::append(&self.pool, playlist_id, song_id, added_by).await
    }

    async fn revive_entry(&self, id: &EntryId, added_by: &UserId) -> Result<PlaylistEntry> {
        entries::revive(&self.pool, id, added_by).await
    }

    async fn remove_entry(&self, id: &EntryId) -> Result<PlaylistEntry> {
        entries::remove(&self.pool, id).await
    }

    async fn set_entry_orders(
        &self,
        playlist_id: &PlaylistId,
        orders: &[(SongId, u32)],
    ) -> Result<u64> {
        entries::set_orders(&self.pool, playlist_id, orders).await
    }

    async fn get_active_entries(&self, playlist_id: &PlaylistId) -> Result<Vec<PlaylistEntry>> {
        entries::get_active(&self.pool, playlist_id).await
    }

    // Contributors
    async fn find_contributor(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<Option<Contributor>> {
        contributors::find(&self.pool, playlist_id, user_id).await
    }

    async fn insert_contributor(&self, contributor: NewContributor) -> Result<Contributor> {
        contributors::insert(&self.pool, contributor).await
    }

    async fn revive_contributor(
        &self,
        id: &ContributorId,
        role: Role,
        invited_by: &UserId,
    ) -> Result<Contributor> {
        contributors::revive(&self.pool, id, role, invited_by).await
    }

    async fn update_contributor_role(&self, id: &ContributorId, role: Role) -> Result<Contributor> {
        contributors::update_role(&self.pool, id, role).await
    }

    async fn remove_contributor(&self, id: &ContributorId) -> Result<Contributor> {
        contributors::remove(&self.pool, id).await
    }

    async fn get_active_contributors(&self, playlist_id: &PlaylistId) -> Result<Vec<Contributor>> {
        contributors::get_active(&self.pool, playlist_id).await
    }
}
