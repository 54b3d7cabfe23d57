//! Playlist queries

use crate::rows::parse_column;
use chorus_core::{error::Result, types::*, ChorusError};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const COLUMNS: &str =
    "id, title, description, owner_id, is_public, state, created_at, updated_at";

fn from_row(row: &SqliteRow) -> Result<Playlist> {
    Ok(Playlist {
        id: PlaylistId::new(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        owner_id: UserId::new(row.try_get::<String, _>("owner_id")?),
        is_public: row.try_get::<i64, _>("is_public")? != 0,
        state: parse_column(row, "state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Create new playlist
pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<Playlist> {
    let id = PlaylistId::generate();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO playlists (id, title, description, owner_id, is_public, state, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 'active', ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(&playlist.title)
    .bind(&playlist.description)
    .bind(playlist.owner_id.as_str())
    .bind(playlist.is_public)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| ChorusError::storage("Failed to retrieve created playlist"))
}

/// Get playlist by ID, including soft-deleted ones
pub async fn get_by_id(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM playlists WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Get all non-deleted playlists, most recently updated first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM playlists WHERE state = 'active' ORDER BY updated_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Get non-deleted playlists owned by a user
pub async fn get_by_owner(pool: &SqlitePool, owner_id: &UserId) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM playlists WHERE owner_id = ? AND state = 'active' ORDER BY updated_at DESC"
    ))
    .bind(owner_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Get non-deleted public playlists
pub async fn get_public(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM playlists WHERE is_public = 1 AND state = 'active' ORDER BY updated_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Apply a metadata patch to a non-deleted playlist
pub async fn update(pool: &SqlitePool, id: &PlaylistId, patch: UpdatePlaylist) -> Result<Playlist> {
    let result = sqlx::query(
        r#"
        UPDATE playlists
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            is_public = COALESCE(?, is_public),
            updated_at = ?
        WHERE id = ? AND state = 'active'
        "#,
    )
    .bind(patch.title)
    .bind(patch.description)
    .bind(patch.is_public)
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChorusError::not_found("Playlist", id.as_str()));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("Playlist", id.as_str()))
}

/// Soft-delete a playlist. Entries and contributors are left as they are;
/// every read path treats a deleted playlist as absent.
pub async fn soft_delete(pool: &SqlitePool, id: &PlaylistId) -> Result<Playlist> {
    let result = sqlx::query(
        "UPDATE playlists SET state = 'soft_deleted', updated_at = ? WHERE id = ? AND state = 'active'",
    )
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChorusError::not_found("Playlist", id.as_str()));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("Playlist", id.as_str()))
}
