/// Subscription registry statistics
use crate::{registry::RegistryStats, state::AppState};
use axum::{extract::State, Json};

/// GET /api/stats
/// Live connection and subscription counts
pub async fn stats(State(app_state): State<AppState>) -> Json<RegistryStats> {
    Json(app_state.registry.stats().await)
}
