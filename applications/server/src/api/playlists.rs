/// Playlists API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chorus_core::{
    requests::{
        validate_playlist_id, CreatePlaylistInput, PlaylistSongInput, ReorderPlaylistSongsInput,
        UpdatePlaylistInput,
    },
    Playlist, PlaylistEntry,
};
use serde::Deserialize;

type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongBody {
    #[serde(default)]
    pub song_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    #[serde(default)]
    pub song_ids: Vec<String>,
}

/// GET /api/playlists
/// Playlists that are public, owned by or shared with the caller
pub async fn list_playlists(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<Playlist>>> {
    Ok(Json(app_state.playlists.playlists(&principal).await?))
}

/// GET /api/playlists/mine
pub async fn my_playlists(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<Playlist>>> {
    Ok(Json(app_state.playlists.my_playlists(&principal).await?))
}

/// GET /api/playlists/public
pub async fn public_playlists(State(app_state): State<AppState>) -> Result<Json<Vec<Playlist>>> {
    Ok(Json(app_state.playlists.public_playlists().await?))
}

/// POST /api/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: JsonBody<CreatePlaylistInput>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let Json(input) = payload?;
    let playlist = app_state
        .playlists
        .create_playlist(&principal, input.validate()?)
        .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/:id
pub async fn get_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Playlist>> {
    let playlist_id = validate_playlist_id(&id)?;
    Ok(Json(
        app_state.playlists.playlist(&principal, &playlist_id).await?,
    ))
}

/// PATCH /api/playlists/:id
pub async fn update_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: JsonBody<UpdatePlaylistInput>,
) -> Result<Json<Playlist>> {
    let Json(input) = payload?;
    let request = input.validate(&id)?;
    Ok(Json(
        app_state
            .playlists
            .update_playlist(&principal, request)
            .await?,
    ))
}

/// DELETE /api/playlists/:id
/// Soft-delete; owner only
pub async fn delete_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Playlist>> {
    let playlist_id = validate_playlist_id(&id)?;
    Ok(Json(
        app_state
            .playlists
            .delete_playlist(&principal, &playlist_id)
            .await?,
    ))
}

/// GET /api/playlists/:id/songs
/// Active entries in order
pub async fn list_playlist_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<PlaylistEntry>>> {
    let playlist_id = validate_playlist_id(&id)?;
    Ok(Json(
        app_state
            .playlists
            .playlist_songs(&principal, &playlist_id)
            .await?,
    ))
}

/// POST /api/playlists/:id/songs
pub async fn add_song_to_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: JsonBody<AddSongBody>,
) -> Result<(StatusCode, Json<PlaylistEntry>)> {
    let Json(body) = payload?;
    let request = PlaylistSongInput {
        playlist_id: id,
        song_id: body.song_id,
    }
    .validate_add()?;

    let entry = app_state
        .playlists
        .add_song_to_playlist(&principal, request)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/playlists/:id/songs/:song_id
pub async fn remove_song_from_playlist(
    Path((id, song_id)): Path<(String, String)>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<PlaylistEntry>> {
    let request = PlaylistSongInput {
        playlist_id: id,
        song_id,
    }
    .validate_remove()?;

    Ok(Json(
        app_state
            .playlists
            .remove_song_from_playlist(&principal, request)
            .await?,
    ))
}

/// PUT /api/playlists/:id/songs/order
/// Entries named in `songIds` get orders 0..n in list order
pub async fn reorder_playlist_songs(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: JsonBody<ReorderBody>,
) -> Result<Json<Vec<PlaylistEntry>>> {
    let Json(body) = payload?;
    let request = ReorderPlaylistSongsInput {
        playlist_id: id,
        song_ids: body.song_ids,
    }
    .validate()?;

    Ok(Json(
        app_state
            .playlists
            .reorder_playlist_songs(&principal, request)
            .await?,
    ))
}
