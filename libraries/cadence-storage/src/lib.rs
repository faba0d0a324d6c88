//! Cadence Storage
//!
//! `SQLite` catalogue and smart playlist evaluation for Cadence.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature (users, artists, albums, songs,
//!   interactions, playlists) owns its own queries
//! - **Per-user interactions**: play counts and likes are always read for an
//!   explicit user, never from ambient session state
//! - **Smart playlists**: rules are compiled by `cadence-rules` and rendered
//!   into SQL by the [`smart`] module on every request; nothing is
//!   materialized
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::types::{PlaylistId, UserId};
//! use cadence_storage::{create_pool, run_migrations, LocalStorageContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cadence.db").await?;
//! run_migrations(&pool).await?;
//!
//! let storage = LocalStorageContext::new(pool, UserId::new(1));
//! let page = storage
//!     .smart_playlist_songs(PlaylistId::new(3), None, None)
//!     .await?;
//! println!("{} of {} songs", page.songs.len(), page.total);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod context;
mod error;

pub mod config;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod interactions;
pub mod playlists;
pub mod songs;
pub mod users;

// Rule evaluation
pub mod smart;

pub use config::StorageConfig;
pub use context::LocalStorageContext;
pub use error::{Result, StorageError};

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before any slice is used.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Create a new `SQLite` pool with default settings
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let config = StorageConfig {
        database_url: database_url.to_string(),
        ..StorageConfig::default()
    };
    create_pool_with(&config).await
}

/// Create a new `SQLite` pool from loaded configuration
///
/// The database file is created if missing and opened in WAL mode, so
/// evaluations can read while a writer holds the database.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the connection fails
pub async fn create_pool_with(config: &StorageConfig) -> Result<SqlitePool> {
    config.validate()?;

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout());

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        url = %config.database_url,
        max_connections = config.max_connections,
        "sqlite pool created"
    );

    Ok(pool)
}
