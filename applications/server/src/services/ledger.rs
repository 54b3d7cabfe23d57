//! Ordered, soft-deletable song ledger of a playlist
//!
//! Callers are expected to have authorized the playlist already; the ledger
//! only enforces entry-level rules.

use chorus_core::{
    error::Result, ChorusError, CollectionStore, PlaylistEntry, PlaylistId, SongId, UserId,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct PlaylistLedger {
    store: Arc<dyn CollectionStore>,
}

impl PlaylistLedger {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Add a song at the end of the playlist.
    ///
    /// A previously removed entry for the same song is revived (same id, new
    /// order, new `added_by`) instead of inserting a second row.
    pub async fn add_entry(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
        added_by: &UserId,
    ) -> Result<PlaylistEntry> {
        self.store
            .get_song(song_id)
            .await?
            .filter(|song| song.is_active())
            .ok_or_else(|| ChorusError::not_found("Song", song_id.as_str()))?;

        match self.store.find_entry(playlist_id, song_id).await? {
            Some(entry) if entry.is_active() => {
                Err(ChorusError::conflict("Song is already in the playlist"))
            }
            Some(entry) => {
                tracing::debug!(entry_id = %entry.id, "Reviving removed playlist entry");
                self.store.revive_entry(&entry.id, added_by).await
            }
            None => self.store.append_entry(playlist_id, song_id, added_by).await,
        }
    }

    /// Mark the song's active entry removed. Orders of the remaining entries
    /// are left as they are.
    pub async fn remove_entry(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
    ) -> Result<PlaylistEntry> {
        let entry = self
            .store
            .find_entry(playlist_id, song_id)
            .await?
            .filter(|entry| entry.is_active())
            .ok_or_else(|| ChorusError::not_found("PlaylistEntry", song_id.as_str()))?;

        self.store.remove_entry(&entry.id).await
    }

    /// Give the i-th listed song order `i`. Unlisted entries keep their
    /// order; listed songs without an active entry are skipped.
    pub async fn reorder(&self, playlist_id: &PlaylistId, song_ids: &[SongId]) -> Result<u64> {
        let orders: Vec<(SongId, u32)> = song_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as u32))
            .collect();

        self.store.set_entry_orders(playlist_id, &orders).await
    }

    /// Active entries sorted by order
    pub async fn list_active(&self, playlist_id: &PlaylistId) -> Result<Vec<PlaylistEntry>> {
        self.store.get_active_entries(playlist_id).await
    }
}
