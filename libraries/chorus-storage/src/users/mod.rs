//! User queries

use crate::rows::parse_column;
use chorus_core::{error::Result, types::*};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const COLUMNS: &str =
    "id, username, email, first_name, last_name, state, created_at, updated_at";

fn from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: UserId::new(row.try_get::<String, _>("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        state: parse_column(row, "state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Create a user. Emails are stored lowercased; duplicates fail with `Conflict`.
pub async fn create(pool: &SqlitePool, user: CreateUser) -> Result<User> {
    let id = UserId::generate();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, first_name, last_name, state, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 'active', ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(user.username.trim())
    .bind(user.email.trim().to_lowercase())
    .bind(user.first_name.trim())
    .bind(user.last_name.trim())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| chorus_core::ChorusError::storage("Failed to retrieve created user"))
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Get all active users ordered by username
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM users WHERE state = 'active' ORDER BY username"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}
