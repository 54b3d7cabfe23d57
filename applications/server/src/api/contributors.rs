/// Contributor API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chorus_core::{
    requests::{validate_playlist_id, ContributorRoleInput, RemoveContributorRequest},
    Contributor,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddContributorBody {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoleBody {
    #[serde(default)]
    pub role: String,
}

/// GET /api/playlists/:id/contributors
pub async fn list_contributors(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<Contributor>>> {
    let playlist_id = validate_playlist_id(&id)?;
    Ok(Json(
        app_state
            .playlists
            .playlist_contributors(&principal, &playlist_id)
            .await?,
    ))
}

/// POST /api/playlists/:id/contributors
pub async fn add_contributor(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: std::result::Result<Json<AddContributorBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Contributor>)> {
    let Json(body) = payload?;
    let request = ContributorRoleInput {
        playlist_id: id,
        user_id: body.user_id,
        role: body.role,
    }
    .validate_add()?;

    let contributor = app_state
        .playlists
        .add_contributor(&principal, request)
        .await?;
    Ok((StatusCode::CREATED, Json(contributor)))
}

/// PUT /api/playlists/:id/contributors/:user_id
pub async fn update_contributor_role(
    Path((id, user_id)): Path<(String, String)>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: std::result::Result<Json<UpdateRoleBody>, JsonRejection>,
) -> Result<Json<Contributor>> {
    let Json(body) = payload?;
    let request = ContributorRoleInput {
        playlist_id: id,
        user_id,
        role: body.role,
    }
    .validate_update()?;

    Ok(Json(
        app_state
            .playlists
            .update_contributor_role(&principal, request)
            .await?,
    ))
}

/// DELETE /api/playlists/:id/contributors/:user_id
pub async fn remove_contributor(
    Path((id, user_id)): Path<(String, String)>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Contributor>> {
    let request = RemoveContributorRequest::validate(&id, &user_id)?;
    Ok(Json(
        app_state
            .playlists
            .remove_contributor(&principal, request)
            .await?,
    ))
}
