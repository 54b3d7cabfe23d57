//! Song queries

use crate::rows::parse_column;
use chorus_core::{error::Result, types::*};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const COLUMNS: &str =
    "id, title, artist, duration_secs, file_id, uploaded_by, state, created_at, updated_at";

fn from_row(row: &SqliteRow) -> Result<Song> {
    let duration: i64 = row.try_get("duration_secs")?;
    Ok(Song {
        id: SongId::new(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        duration_secs: u32::try_from(duration).map_err(|_| {
            chorus_core::ChorusError::storage(format!("invalid duration {duration}"))
        })?,
        file_id: row.try_get("file_id")?,
        uploaded_by: UserId::new(row.try_get::<String, _>("uploaded_by")?),
        state: parse_column(row, "state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Create a song record
pub async fn create(pool: &SqlitePool, song: CreateSong) -> Result<Song> {
    let id = SongId::generate();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO songs (id, title, artist, duration_secs, file_id, uploaded_by, state, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 'active', ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(&song.title)
    .bind(&song.artist)
    .bind(i64::from(song.duration_secs))
    .bind(&song.file_id)
    .bind(song.uploaded_by.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| chorus_core::ChorusError::storage("Failed to retrieve created song"))
}

/// Get song by ID
pub async fn get_by_id(pool: &SqlitePool, id: &SongId) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM songs WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Get all active songs, newest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Song>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM songs WHERE state = 'active' ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Mark a song soft-deleted
pub async fn soft_delete(pool: &SqlitePool, id: &SongId) -> Result<()> {
    let result = sqlx::query(
        "UPDATE songs SET state = 'soft_deleted', updated_at = ? WHERE id = ? AND state = 'active'",
    )
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(chorus_core::ChorusError::not_found("Song", id.as_str()));
    }
    Ok(())
}
