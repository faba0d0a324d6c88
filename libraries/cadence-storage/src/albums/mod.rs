use crate::error::{Result, StorageError};
use cadence_core::types::{Album, AlbumId, ArtistId, CreateAlbum};
use cadence_rules::fold_case;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const SELECT_ALBUM: &str = r#"
    SELECT al.id, al.name, al.artist_id, ar.name AS artist_name,
           al.created_at, al.updated_at
    FROM albums al
    LEFT JOIN artists ar ON ar.id = al.artist_id
"#;

fn album_from_row(row: &SqliteRow) -> std::result::Result<Album, sqlx::Error> {
    Ok(Album {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        artist_id: row.try_get("artist_id")?,
        artist_name: row.try_get("artist_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Get album by ID
pub async fn get_by_id(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(&format!("{SELECT_ALBUM} WHERE al.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(album_from_row).transpose()?)
}

/// Find an artist's album by exact name
pub async fn find_by_name(
    pool: &SqlitePool,
    artist_id: ArtistId,
    name: &str,
) -> Result<Option<Album>> {
    let row = sqlx::query(&format!("{SELECT_ALBUM} WHERE al.artist_id = ? AND al.name = ?"))
        .bind(artist_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(album_from_row).transpose()?)
}

/// Get albums by artist
pub async fn get_by_artist(pool: &SqlitePool, artist_id: ArtistId) -> Result<Vec<Album>> {
    let rows = sqlx::query(&format!("{SELECT_ALBUM} WHERE al.artist_id = ? ORDER BY al.name"))
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(album_from_row).collect::<std::result::Result<_, _>>()?)
}

/// Create new album
pub async fn create(pool: &SqlitePool, album: CreateAlbum) -> Result<Album> {
    let id = sqlx::query("INSERT INTO albums (name, name_folded, artist_id) VALUES (?, ?, ?)")
        .bind(&album.name)
        .bind(fold_case(&album.name))
        .bind(album.artist_id)
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Album", id))
}
