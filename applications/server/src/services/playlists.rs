//! Playlist queries and mutations
//!
//! Each mutation authorizes the caller, performs a single ledger or metadata
//! write and then publishes the resulting entity. Errors from access control
//! and the ledger surface unchanged; nothing is published on failure.

use crate::events::{EventBus, PlaylistEvent, RemovedSong};
use crate::services::{AccessControl, PlaylistLedger};
use chorus_core::requests::{
    AddContributorRequest, AddSongToPlaylistRequest, CreatePlaylistRequest,
    RemoveContributorRequest, RemoveSongFromPlaylistRequest, ReorderPlaylistSongsRequest,
    UpdateContributorRoleRequest, UpdatePlaylistRequest,
};
use chorus_core::{
    error::Result, ChorusError, CollectionStore, Contributor, CreatePlaylist, NewContributor,
    Playlist, PlaylistEntry, PlaylistId, Principal, Role, UpdatePlaylist, UserId,
};
use std::collections::HashSet;
use std::sync::Arc;

pub struct PlaylistService {
    store: Arc<dyn CollectionStore>,
    access: AccessControl,
    ledger: PlaylistLedger,
    bus: Arc<dyn EventBus>,
}

impl PlaylistService {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        access: AccessControl,
        ledger: PlaylistLedger,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            store,
            access,
            ledger,
            bus,
        }
    }

    fn publish(&self, event: PlaylistEvent) {
        let topic = event.topic();
        tracing::debug!(topic = %topic, "Publishing playlist event");
        self.bus.publish(&topic, event);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// A single playlist: public, owned or shared with the caller
    pub async fn playlist(&self, principal: &Principal, id: &PlaylistId) -> Result<Playlist> {
        self.access.resolve_read_access(id, &principal.id).await
    }

    /// Every non-deleted playlist the caller can see
    pub async fn playlists(&self, principal: &Principal) -> Result<Vec<Playlist>> {
        let shared: HashSet<PlaylistId> = self
            .store
            .get_contributed_playlist_ids(&principal.id)
            .await?
            .into_iter()
            .collect();

        Ok(self
            .store
            .get_playlists()
            .await?
            .into_iter()
            .filter(|p| p.is_public || p.is_owned_by(&principal.id) || shared.contains(&p.id))
            .collect())
    }

    /// Playlists owned by the caller
    pub async fn my_playlists(&self, principal: &Principal) -> Result<Vec<Playlist>> {
        self.store.get_playlists_by_owner(&principal.id).await
    }

    pub async fn public_playlists(&self) -> Result<Vec<Playlist>> {
        self.store.get_public_playlists().await
    }

    /// Active entries of a readable playlist, in order
    pub async fn playlist_songs(
        &self,
        principal: &Principal,
        id: &PlaylistId,
    ) -> Result<Vec<PlaylistEntry>> {
        self.access.resolve_read_access(id, &principal.id).await?;
        self.ledger.list_active(id).await
    }

    /// Active contributors of a readable playlist
    pub async fn playlist_contributors(
        &self,
        principal: &Principal,
        id: &PlaylistId,
    ) -> Result<Vec<Contributor>> {
        self.access.resolve_read_access(id, &principal.id).await?;
        self.store.get_active_contributors(id).await
    }

    // ========================================================================
    // Playlist metadata
    // ========================================================================

    pub async fn create_playlist(
        &self,
        principal: &Principal,
        request: CreatePlaylistRequest,
    ) -> Result<Playlist> {
        let playlist = self
            .store
            .create_playlist(CreatePlaylist {
                title: request.title,
                description: request.description,
                owner_id: principal.id.clone(),
                is_public: request.is_public,
            })
            .await?;

        tracing::info!(playlist_id = %playlist.id, owner_id = %principal.id, "Playlist created");
        Ok(playlist)
    }

    /// Patch title, description or visibility (EDITOR+)
    pub async fn update_playlist(
        &self,
        principal: &Principal,
        request: UpdatePlaylistRequest,
    ) -> Result<Playlist> {
        self.access
            .resolve_access(&request.playlist_id, &principal.id, Some(Role::Editor))
            .await?;

        let playlist = self
            .store
            .update_playlist(
                &request.playlist_id,
                UpdatePlaylist {
                    title: request.title,
                    description: request.description,
                    is_public: request.is_public,
                },
            )
            .await?;

        self.publish(PlaylistEvent::PlaylistUpdated(playlist.clone()));
        Ok(playlist)
    }

    /// Soft-delete a playlist (owner only)
    pub async fn delete_playlist(&self, principal: &Principal, id: &PlaylistId) -> Result<Playlist> {
        self.access.require_owner(id, &principal.id).await?;

        let playlist = self.store.soft_delete_playlist(id).await?;
        tracing::info!(playlist_id = %id, "Playlist deleted");

        self.publish(PlaylistEvent::PlaylistUpdated(playlist.clone()));
        Ok(playlist)
    }

    // ========================================================================
    // Songs
    // ========================================================================

    /// Append a song, reviving a removed entry when there is one (EDITOR+)
    pub async fn add_song_to_playlist(
        &self,
        principal: &Principal,
        request: AddSongToPlaylistRequest,
    ) -> Result<PlaylistEntry> {
        self.access
            .resolve_access(&request.playlist_id, &principal.id, Some(Role::Editor))
            .await?;

        let entry = self
            .ledger
            .add_entry(&request.playlist_id, &request.song_id, &principal.id)
            .await?;

        self.publish(PlaylistEvent::SongAddedToPlaylist(entry.clone()));
        Ok(entry)
    }

    /// Remove a song (EDITOR+)
    pub async fn remove_song_from_playlist(
        &self,
        principal: &Principal,
        request: RemoveSongFromPlaylistRequest,
    ) -> Result<PlaylistEntry> {
        self.access
            .resolve_access(&request.playlist_id, &principal.id, Some(Role::Editor))
            .await?;

        let entry = self
            .ledger
            .remove_entry(&request.playlist_id, &request.song_id)
            .await?;

        self.publish(PlaylistEvent::SongRemovedFromPlaylist(RemovedSong {
            playlist_id: request.playlist_id,
            song_id: request.song_id,
        }));
        Ok(entry)
    }

    /// Reorder songs; returns the active entries in their new order (EDITOR+)
    pub async fn reorder_playlist_songs(
        &self,
        principal: &Principal,
        request: ReorderPlaylistSongsRequest,
    ) -> Result<Vec<PlaylistEntry>> {
        let grant = self
            .access
            .resolve_access(&request.playlist_id, &principal.id, Some(Role::Editor))
            .await?;

        let updated = self
            .ledger
            .reorder(&request.playlist_id, &request.song_ids)
            .await?;
        tracing::debug!(
            playlist_id = %request.playlist_id,
            requested = request.song_ids.len(),
            updated,
            "Playlist reordered"
        );

        let entries = self.ledger.list_active(&request.playlist_id).await?;
        self.publish(PlaylistEvent::PlaylistUpdated(grant.playlist));
        Ok(entries)
    }

    // ========================================================================
    // Contributors
    // ========================================================================

    /// Grant a role, reviving a removed grant when there is one (ADMIN/owner)
    pub async fn add_contributor(
        &self,
        principal: &Principal,
        request: AddContributorRequest,
    ) -> Result<Contributor> {
        let grant = self
            .access
            .resolve_access(&request.playlist_id, &principal.id, Some(Role::Admin))
            .await?;

        if grant.playlist.is_owned_by(&request.user_id) {
            return Err(ChorusError::invalid(
                "userId",
                "owner cannot be added as a contributor",
            ));
        }
        self.active_user(&request.user_id).await?;

        let contributor = match self
            .store
            .find_contributor(&request.playlist_id, &request.user_id)
            .await?
        {
            Some(existing) if existing.is_active() => {
                return Err(ChorusError::conflict("User is already a contributor"));
            }
            Some(existing) => {
                self.store
                    .revive_contributor(&existing.id, request.role, &principal.id)
                    .await?
            }
            None => {
                self.store
                    .insert_contributor(NewContributor {
                        playlist_id: request.playlist_id.clone(),
                        user_id: request.user_id.clone(),
                        role: request.role,
                        invited_by: principal.id.clone(),
                    })
                    .await?
            }
        };

        tracing::info!(
            playlist_id = %request.playlist_id,
            user_id = %request.user_id,
            role = %request.role,
            "Contributor added"
        );

        self.publish(PlaylistEvent::ContributorAdded(contributor.clone()));
        Ok(contributor)
    }

    /// Change a contributor's role (ADMIN/owner)
    pub async fn update_contributor_role(
        &self,
        principal: &Principal,
        request: UpdateContributorRoleRequest,
    ) -> Result<Contributor> {
        let grant = self
            .access
            .resolve_access(&request.playlist_id, &principal.id, Some(Role::Admin))
            .await?;

        let existing = self
            .active_contributor(&request.playlist_id, &request.user_id)
            .await?;
        let contributor = self
            .store
            .update_contributor_role(&existing.id, request.role)
            .await?;

        self.publish(PlaylistEvent::PlaylistUpdated(grant.playlist));
        Ok(contributor)
    }

    /// Revoke a contributor's grant (ADMIN/owner)
    pub async fn remove_contributor(
        &self,
        principal: &Principal,
        request: RemoveContributorRequest,
    ) -> Result<Contributor> {
        let grant = self
            .access
            .resolve_access(&request.playlist_id, &principal.id, Some(Role::Admin))
            .await?;

        let existing = self
            .active_contributor(&request.playlist_id, &request.user_id)
            .await?;
        let contributor = self.store.remove_contributor(&existing.id).await?;

        tracing::info!(
            playlist_id = %request.playlist_id,
            user_id = %request.user_id,
            "Contributor removed"
        );

        self.publish(PlaylistEvent::PlaylistUpdated(grant.playlist));
        Ok(contributor)
    }

    async fn active_user(&self, user_id: &UserId) -> Result<()> {
        self.store
            .get_user(user_id)
            .await?
            .filter(|u| u.is_active())
            .map(|_| ())
            .ok_or_else(|| ChorusError::not_found("User", user_id.as_str()))
    }

    async fn active_contributor(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<Contributor> {
        self.store
            .find_contributor(playlist_id, user_id)
            .await?
            .filter(|c| c.is_active())
            .ok_or_else(|| ChorusError::not_found("Contributor", user_id.as_str()))
    }
}
