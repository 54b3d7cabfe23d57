//! Chorus Storage
//!
//! `SQLite` implementation of the Chorus collection store, plus an outbox
//! table that doubles as a message broker for multi-instance deployments.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each collection owns its own queries
//!   (`users`, `songs`, `playlists`, `entries`, `contributors`)
//! - **Soft deletion**: rows carry a lifecycle `state` column and are never
//!   physically deleted by the store
//! - **Atomic ordering**: new and revived entries get their position from the
//!   same statement that writes them
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_storage::{SqliteStore, create_pool, run_migrations};
//! use chorus_core::CollectionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://chorus.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteStore::new(pool);
//! let playlists = store.get_public_playlists().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod rows;

// Vertical slices
pub mod contributors;
pub mod entries;
pub mod playlists;
pub mod songs;
pub mod users;

// Multi-instance event fan-out
pub mod broker;

pub use broker::SqliteBroker;
pub use context::SqliteStore;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://chorus.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("SQLite pool created");

    Ok(pool)
}
