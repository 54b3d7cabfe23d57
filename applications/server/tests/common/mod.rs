//! Common test utilities and fixtures
#![allow(dead_code)]

use chorus_core::requests::{AddContributorRequest, CreatePlaylistRequest};
use chorus_core::{
    CollectionStore, Contributor, CreateSong, CreateUser, Playlist, Principal, Role, SongId,
    UserId,
};
use chorus_server::{
    events::{EventBus, InProcessEventBus, PlaylistEvent},
    registry::Delivery,
    services::AuthService,
    state::AppState,
};
use chorus_storage::SqliteStore;
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const TEST_SECRET: &str = "test-secret-key";

/// How long a test waits before concluding nothing was delivered
pub const QUIET_PERIOD: Duration = Duration::from_millis(150);

/// A fully wired application over a throwaway SQLite file
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<SqliteStore>,
    pub auth: Arc<AuthService>,
    pub bus: Arc<dyn EventBus>,
    temp_dir: Arc<TempDir>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_bus(Arc::new(InProcessEventBus::new())).await
    }

    pub async fn with_bus(bus: Arc<dyn EventBus>) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = create_store(&temp_dir).await;
        Self::assemble(store, bus, Arc::new(temp_dir))
    }

    /// A second server instance over the same database
    pub fn sibling(&self, bus: Arc<dyn EventBus>) -> Self {
        Self::assemble(self.store.clone(), bus, Arc::clone(&self.temp_dir))
    }

    fn assemble(store: Arc<SqliteStore>, bus: Arc<dyn EventBus>, temp_dir: Arc<TempDir>) -> Self {
        let auth = Arc::new(AuthService::new(TEST_SECRET, 1));
        let state = AppState::new(store.clone(), Arc::clone(&auth), Arc::clone(&bus));
        Self {
            state,
            store,
            auth,
            bus,
            temp_dir,
        }
    }

    /// Create a user and return its principal
    pub async fn user(&self, username: &str) -> Principal {
        let user = self
            .store
            .create_user(CreateUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Test".to_string(),
                last_name: username.to_string(),
            })
            .await
            .expect("Failed to create user");
        Principal::new(user.id, user.email)
    }

    pub fn token(&self, principal: &Principal) -> String {
        self.auth
            .create_access_token(principal)
            .expect("Failed to create token")
    }

    pub async fn song(&self, title: &str, uploaded_by: &UserId) -> SongId {
        self.store
            .create_song(CreateSong {
                title: title.to_string(),
                artist: "Test Artist".to_string(),
                duration_secs: 200,
                file_id: format!("file-{title}"),
                uploaded_by: uploaded_by.clone(),
            })
            .await
            .expect("Failed to create song")
            .id
    }

    pub async fn playlist(&self, owner: &Principal, title: &str, is_public: bool) -> Playlist {
        self.state
            .playlists
            .create_playlist(
                owner,
                CreatePlaylistRequest {
                    title: title.to_string(),
                    description: String::new(),
                    is_public,
                },
            )
            .await
            .expect("Failed to create playlist")
    }

    pub async fn grant(
        &self,
        admin: &Principal,
        playlist: &Playlist,
        user: &Principal,
        role: Role,
    ) -> Contributor {
        self.state
            .playlists
            .add_contributor(
                admin,
                AddContributorRequest {
                    playlist_id: playlist.id.clone(),
                    user_id: user.id.clone(),
                    role,
                },
            )
            .await
            .expect("Failed to add contributor")
    }
}

/// Open a migrated store in `dir`
pub async fn create_store(dir: &TempDir) -> Arc<SqliteStore> {
    let db_url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = chorus_storage::create_pool(&db_url)
        .await
        .expect("Failed to create pool");
    chorus_storage::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(SqliteStore::new(pool))
}

/// Next item from a stream, failing the test after a second
pub async fn next_within<S>(stream: &mut S) -> S::Item
where
    S: Stream + Unpin,
{
    tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
}

/// Next delivery for a registry sink, failing the test after a second
pub async fn next_delivery(rx: &mut mpsc::UnboundedReceiver<Delivery>) -> Delivery {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("delivery channel closed")
}

/// Assert that nothing arrives within the quiet period
pub async fn assert_no_delivery(rx: &mut mpsc::UnboundedReceiver<Delivery>) {
    if let Ok(Some(delivery)) = tokio::time::timeout(QUIET_PERIOD, rx.recv()).await {
        panic!("unexpected delivery: {delivery:?}");
    }
}

/// Assert that a stream yields nothing within the quiet period
pub async fn assert_quiet<S>(stream: &mut S)
where
    S: Stream + Unpin,
    S::Item: std::fmt::Debug,
{
    if let Ok(Some(item)) = tokio::time::timeout(QUIET_PERIOD, stream.next()).await {
        panic!("unexpected event: {item:?}");
    }
}

pub fn song_added_order(event: &PlaylistEvent) -> u32 {
    match event {
        PlaylistEvent::SongAddedToPlaylist(entry) => entry.order,
        other => panic!("expected songAddedToPlaylist, got {other:?}"),
    }
}
