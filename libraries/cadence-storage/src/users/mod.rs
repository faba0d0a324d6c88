//! User accounts
//!
//! Users only matter to smart playlists as the scope of interaction rows
//! and as playlist owners.

use crate::error::{Result, StorageError};
use cadence_core::types::{User, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Create a user
pub async fn create(pool: &SqlitePool, name: &str) -> Result<User> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::invalid_input("user name cannot be empty"));
    }

    let id = sqlx::query("INSERT INTO users (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_by_id(pool, UserId::new(id))
        .await?
        .ok_or_else(|| StorageError::not_found("User", id))
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, name, created_at FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row).transpose()?)
}

/// Get all users
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query("SELECT id, name, created_at FROM users ORDER BY name, id")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(user_from_row).collect::<std::result::Result<_, _>>()?)
}
