//! Playlist entry queries
//!
//! Positions for new and revived entries are computed inside the writing
//! statement (`MAX(position) + 1` over active entries), so concurrent appends
//! on one database never read a stale maximum.

use crate::rows::{parse_column, position};
use chorus_core::{error::Result, types::*, ChorusError};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const COLUMNS: &str =
    "id, playlist_id, song_id, added_by, position, state, created_at, updated_at";

fn from_row(row: &SqliteRow) -> Result<PlaylistEntry> {
    Ok(PlaylistEntry {
        id: EntryId::new(row.try_get::<String, _>("id")?),
        playlist_id: PlaylistId::new(row.try_get::<String, _>("playlist_id")?),
        song_id: SongId::new(row.try_get::<String, _>("song_id")?),
        added_by: UserId::new(row.try_get::<String, _>("added_by")?),
        order: position(row, "position")?,
        state: parse_column(row, "state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Get entry by ID
pub async fn get_by_id(pool: &SqlitePool, id: &EntryId) -> Result<Option<PlaylistEntry>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM playlist_entries WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Find the entry for a (playlist, song) pair in any state
pub async fn find(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    song_id: &SongId,
) -> Result<Option<PlaylistEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM playlist_entries WHERE playlist_id = ? AND song_id = ?"
    ))
    .bind(playlist_id.as_str())
    .bind(song_id.as_str())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Insert a fresh active entry at the end of the playlist
pub async fn append(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    song_id: &SongId,
    added_by: &UserId,
) -> Result<PlaylistEntry> {
    let id = EntryId::generate();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO playlist_entries (id, playlist_id, song_id, added_by, position, state, created_at, updated_at)
        SELECT ?, ?, ?, ?, COALESCE(MAX(position) + 1, 0), 'active', ?, ?
        FROM playlist_entries
        WHERE playlist_id = ? AND state = 'active'
        "#,
    )
    .bind(id.as_str())
    .bind(playlist_id.as_str())
    .bind(song_id.as_str())
    .bind(added_by.as_str())
    .bind(now)
    .bind(now)
    .bind(playlist_id.as_str())
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| ChorusError::storage("Failed to retrieve created entry"))
}

/// Revive a removed entry at the end of the playlist
pub async fn revive(pool: &SqlitePool, id: &EntryId, added_by: &UserId) -> Result<PlaylistEntry> {
    let result = sqlx::query(
        r#"
        UPDATE playlist_entries
        SET state = 'active',
            added_by = ?,
            updated_at = ?,
            position = (
                SELECT COALESCE(MAX(e2.position) + 1, 0)
                FROM playlist_entries e2
                WHERE e2.playlist_id = playlist_entries.playlist_id
                  AND e2.state = 'active'
            )
        WHERE id = ? AND state = 'removed'
        "#,
    )
    .bind(added_by.as_str())
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    let entry = get_by_id(pool, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("PlaylistEntry", id.as_str()))?;

    if result.rows_affected() == 0 {
        return Err(ChorusError::conflict("Song is already in the playlist"));
    }
    Ok(entry)
}

/// Mark an active entry removed without renumbering the others
pub async fn remove(pool: &SqlitePool, id: &EntryId) -> Result<PlaylistEntry> {
    let result = sqlx::query(
        "UPDATE playlist_entries SET state = 'removed', updated_at = ? WHERE id = ? AND state = 'active'",
    )
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChorusError::not_found("PlaylistEntry", id.as_str()));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("PlaylistEntry", id.as_str()))
}

/// Assign positions to the listed songs' active entries in one transaction.
/// Songs without an active entry are skipped.
pub async fn set_orders(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    orders: &[(SongId, u32)],
) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let mut updated = 0;

    for (song_id, order) in orders {
        let result = sqlx::query(
            r#"
            UPDATE playlist_entries
            SET position = ?, updated_at = ?
            WHERE playlist_id = ? AND song_id = ? AND state = 'active'
            "#,
        )
        .bind(i64::from(*order))
        .bind(now)
        .bind(playlist_id.as_str())
        .bind(song_id.as_str())
        .execute(&mut *tx)
        .await?;
        updated += result.rows_affected();
    }

    tx.commit().await?;

    Ok(updated)
}

/// Active entries of a playlist, ascending by position
pub async fn get_active(pool: &SqlitePool, playlist_id: &PlaylistId) -> Result<Vec<PlaylistEntry>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {COLUMNS}
        FROM playlist_entries
        WHERE playlist_id = ? AND state = 'active'
        ORDER BY position, updated_at
        "#
    ))
    .bind(playlist_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}
