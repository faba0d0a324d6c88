use crate::error::{Result, StorageError};
use cadence_core::types::{Artist, ArtistId, CreateArtist};
use cadence_rules::fold_case;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn artist_from_row(row: &SqliteRow) -> std::result::Result<Artist, sqlx::Error> {
    Ok(Artist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Get artist by ID
pub async fn get_by_id(pool: &SqlitePool, id: ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query("SELECT id, name, created_at, updated_at FROM artists WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(artist_from_row).transpose()?)
}

/// Find artist by exact name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let row = sqlx::query("SELECT id, name, created_at, updated_at FROM artists WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(artist_from_row).transpose()?)
}

/// Create new artist
pub async fn create(pool: &SqlitePool, artist: CreateArtist) -> Result<Artist> {
    let id = sqlx::query("INSERT INTO artists (name, name_folded) VALUES (?, ?)")
        .bind(&artist.name)
        .bind(fold_case(&artist.name))
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Artist", id))
}

/// Find an artist by name, creating it if missing
pub async fn find_or_create(pool: &SqlitePool, name: &str) -> Result<Artist> {
    if let Some(artist) = find_by_name(pool, name).await? {
        return Ok(artist);
    }

    create(
        pool,
        CreateArtist {
            name: name.to_string(),
        },
    )
    .await
}
