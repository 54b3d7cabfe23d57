/// Shared application state
use crate::events::EventBus;
use crate::registry::ConnectionRegistry;
use crate::services::{AccessControl, AuthService, PlaylistLedger, PlaylistService};
use chorus_core::CollectionStore;
use std::sync::Arc;

/// Application state shared across all handlers
///
/// The event bus is chosen by the caller and handed in here; nothing below
/// reaches for a global instance.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CollectionStore>,
    pub auth_service: Arc<AuthService>,
    pub playlists: Arc<PlaylistService>,
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        auth_service: Arc<AuthService>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        let access = AccessControl::new(Arc::clone(&store));
        let ledger = PlaylistLedger::new(Arc::clone(&store));

        let playlists = PlaylistService::new(
            Arc::clone(&store),
            access.clone(),
            ledger,
            Arc::clone(&bus),
        );
        let registry = ConnectionRegistry::new(auth_service.clone(), access, bus);

        Self {
            store,
            auth_service,
            playlists: Arc::new(playlists),
            registry: Arc::new(registry),
        }
    }
}
