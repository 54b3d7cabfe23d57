/// User API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use chorus_core::{requests::validate_user_id, ChorusError, User, UserId};

async fn active_user(app_state: &AppState, id: &UserId) -> Result<User> {
    let user = app_state
        .store
        .get_user(id)
        .await?
        .filter(User::is_active)
        .ok_or_else(|| ChorusError::not_found("User", id.as_str()))?;
    Ok(user)
}

/// GET /api/me
pub async fn me(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<User>> {
    Ok(Json(active_user(&app_state, &principal.id).await?))
}

/// GET /api/users
pub async fn list_users(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<Vec<User>>> {
    let users = app_state.store.get_all_users().await?;
    Ok(Json(users))
}

/// GET /api/users/:id
pub async fn get_user(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<User>> {
    let user_id = validate_user_id(&id)?;
    Ok(Json(active_user(&app_state, &user_id).await?))
}
