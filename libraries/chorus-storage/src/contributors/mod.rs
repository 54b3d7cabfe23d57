//! Contributor queries

use crate::rows::parse_column;
use chorus_core::{error::Result, types::*, ChorusError};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const COLUMNS: &str =
    "id, playlist_id, user_id, role, invited_by, state, created_at, updated_at";

fn from_row(row: &SqliteRow) -> Result<Contributor> {
    Ok(Contributor {
        id: ContributorId::new(row.try_get::<String, _>("id")?),
        playlist_id: PlaylistId::new(row.try_get::<String, _>("playlist_id")?),
        user_id: UserId::new(row.try_get::<String, _>("user_id")?),
        role: parse_column(row, "role")?,
        invited_by: UserId::new(row.try_get::<String, _>("invited_by")?),
        state: parse_column(row, "state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Get contributor row by ID
pub async fn get_by_id(pool: &SqlitePool, id: &ContributorId) -> Result<Option<Contributor>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM contributors WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Find the contributor row for a (playlist, user) pair in any state
pub async fn find(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    user_id: &UserId,
) -> Result<Option<Contributor>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM contributors WHERE playlist_id = ? AND user_id = ?"
    ))
    .bind(playlist_id.as_str())
    .bind(user_id.as_str())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Insert an active contributor row; a second row for the pair fails with `Conflict`
pub async fn insert(pool: &SqlitePool, contributor: NewContributor) -> Result<Contributor> {
    let id = ContributorId::generate();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO contributors (id, playlist_id, user_id, role, invited_by, state, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 'active', ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(contributor.playlist_id.as_str())
    .bind(contributor.user_id.as_str())
    .bind(contributor.role.as_str())
    .bind(contributor.invited_by.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| ChorusError::storage("Failed to retrieve created contributor"))
}

/// Reactivate a removed row with a new role and inviter
pub async fn revive(
    pool: &SqlitePool,
    id: &ContributorId,
    role: Role,
    invited_by: &UserId,
) -> Result<Contributor> {
    let result = sqlx::query(
        r#"
        UPDATE contributors
        SET state = 'active', role = ?, invited_by = ?, updated_at = ?
        WHERE id = ? AND state = 'removed'
        "#,
    )
    .bind(role.as_str())
    .bind(invited_by.as_str())
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    let contributor = get_by_id(pool, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("Contributor", id.as_str()))?;

    if result.rows_affected() == 0 {
        return Err(ChorusError::conflict("User is already a contributor"));
    }
    Ok(contributor)
}

/// Change the role of an active row
pub async fn update_role(pool: &SqlitePool, id: &ContributorId, role: Role) -> Result<Contributor> {
    let result = sqlx::query(
        "UPDATE contributors SET role = ?, updated_at = ? WHERE id = ? AND state = 'active'",
    )
    .bind(role.as_str())
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChorusError::not_found("Contributor", id.as_str()));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("Contributor", id.as_str()))
}

/// Mark an active row removed
pub async fn remove(pool: &SqlitePool, id: &ContributorId) -> Result<Contributor> {
    let result = sqlx::query(
        "UPDATE contributors SET state = 'removed', updated_at = ? WHERE id = ? AND state = 'active'",
    )
    .bind(Utc::now())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChorusError::not_found("Contributor", id.as_str()));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ChorusError::not_found("Contributor", id.as_str()))
}

/// Active contributors of a playlist, oldest grant first
pub async fn get_active(pool: &SqlitePool, playlist_id: &PlaylistId) -> Result<Vec<Contributor>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM contributors WHERE playlist_id = ? AND state = 'active' ORDER BY created_at"
    ))
    .bind(playlist_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// IDs of playlists where the user holds an active row
pub async fn get_playlist_ids_for_user(
    pool: &SqlitePool,
    user_id: &UserId,
) -> Result<Vec<PlaylistId>> {
    let rows = sqlx::query(
        "SELECT playlist_id FROM contributors WHERE user_id = ? AND state = 'active'",
    )
    .bind(user_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| Ok(PlaylistId::new(row.try_get::<String, _>("playlist_id")?)))
        .collect()
}
