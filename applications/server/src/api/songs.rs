/// Song API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chorus_core::{
    requests::{validate_song_id, CreateSongInput},
    ChorusError, CreateSong, Song,
};

/// GET /api/songs
pub async fn list_songs(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<Vec<Song>>> {
    let songs = app_state.store.get_all_songs().await?;
    Ok(Json(songs))
}

/// GET /api/songs/:id
pub async fn get_song(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<Song>> {
    let song_id = validate_song_id(&id)?;
    let song = app_state
        .store
        .get_song(&song_id)
        .await?
        .filter(Song::is_active)
        .ok_or_else(|| ChorusError::not_found("Song", song_id.as_str()))?;

    Ok(Json(song))
}

/// POST /api/songs
/// Register song metadata; the audio itself lives in file storage
pub async fn create_song(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: std::result::Result<Json<CreateSongInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Song>)> {
    let Json(input) = payload?;
    let request = input.validate()?;

    let song = app_state
        .store
        .create_song(CreateSong {
            title: request.title,
            artist: request.artist,
            duration_secs: request.duration_secs,
            file_id: request.file_id,
            uploaded_by: principal.id,
        })
        .await?;

    tracing::info!(song_id = %song.id, "Song created");
    Ok((StatusCode::CREATED, Json(song)))
}
