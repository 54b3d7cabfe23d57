//! Effective permissions per (playlist, user)

use chorus_core::{
    error::Result, ChorusError, CollectionStore, Playlist, PlaylistId, Role, UserId,
};
use std::sync::Arc;

/// Outcome of a successful access check
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub playlist: Playlist,
    pub is_owner: bool,
    pub role: Role,
}

/// Resolves roles from ownership and active contributor rows.
///
/// Pure reads against the collection store; nothing is cached, so a revoked
/// grant takes effect on the next check.
#[derive(Clone)]
pub struct AccessControl {
    store: Arc<dyn CollectionStore>,
}

impl AccessControl {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Resolve the caller's role on a playlist, optionally requiring a minimum.
    ///
    /// Owners are `Admin` without a contributor row. Everyone else needs an
    /// active contributor row whose role satisfies `required`.
    pub async fn resolve_access(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
        required: Option<Role>,
    ) -> Result<AccessGrant> {
        let playlist = self.live_playlist(playlist_id).await?;

        if playlist.is_owned_by(user_id) {
            return Ok(AccessGrant {
                playlist,
                is_owner: true,
                role: Role::Admin,
            });
        }

        let contributor = self
            .store
            .find_contributor(playlist_id, user_id)
            .await?
            .filter(|c| c.is_active())
            .ok_or_else(|| ChorusError::forbidden("You do not have access to this playlist"))?;

        if let Some(required) = required {
            if !contributor.role.satisfies(required) {
                return Err(ChorusError::forbidden(format!(
                    "This action requires the {required} role"
                )));
            }
        }

        Ok(AccessGrant {
            playlist,
            is_owner: false,
            role: contributor.role,
        })
    }

    /// Visibility check for read-only queries: public playlists are readable
    /// by anyone, private ones need any role.
    pub async fn resolve_read_access(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<Playlist> {
        let playlist = self.live_playlist(playlist_id).await?;
        if playlist.is_public {
            return Ok(playlist);
        }

        self.resolve_access(playlist_id, user_id, None)
            .await
            .map(|grant| grant.playlist)
    }

    /// Ownership check for operations reserved to the owner
    pub async fn require_owner(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<AccessGrant> {
        let grant = self.resolve_access(playlist_id, user_id, None).await?;
        if !grant.is_owner {
            return Err(ChorusError::forbidden(
                "Only the playlist owner can do this",
            ));
        }
        Ok(grant)
    }

    async fn live_playlist(&self, playlist_id: &PlaylistId) -> Result<Playlist> {
        self.store
            .get_playlist(playlist_id)
            .await?
            .filter(|p| !p.is_deleted())
            .ok_or_else(|| ChorusError::not_found("Playlist", playlist_id.as_str()))
    }
}
