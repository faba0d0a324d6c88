//! Song catalogue
//!
//! Songs are always read together with their album and artist names and
//! the viewing user's interaction (play count and liked flag). Songs the
//! user never touched read as zero plays, not liked.

use crate::error::{Result, StorageError};
use cadence_core::types::{AlbumId, CreateSong, Song, SongId, UserId};
use cadence_rules::fold_case;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

fn push_select(builder: &mut QueryBuilder<'_, Sqlite>, viewer: Option<UserId>) {
    builder.push(
        r#"
        SELECT s.id, s.title, s.length, s.track, s.disc, s.path,
               s.album_id, al.name AS album_name,
               s.artist_id, ar.name AS artist_name,
               COALESCE(i.play_count, 0) AS play_count,
               COALESCE(i.liked, 0) AS liked,
               s.created_at, s.updated_at
        FROM songs s
        INNER JOIN albums al ON al.id = s.album_id
        INNER JOIN artists ar ON ar.id = s.artist_id
        LEFT JOIN interactions i ON i.song_id = s.id AND i.user_id = "#,
    );
    // No viewer: bind an id no row can have so the join stays empty
    builder.push_bind(viewer.map_or(0, |user| user.as_i64()));
}

pub(crate) fn song_from_row(row: &SqliteRow) -> std::result::Result<Song, sqlx::Error> {
    Ok(Song {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        length: row.try_get("length")?,
        track: row.try_get("track")?,
        disc: row.try_get("disc")?,
        path: row.try_get("path")?,
        album_id: row.try_get("album_id")?,
        album_name: row.try_get("album_name")?,
        artist_id: row.try_get("artist_id")?,
        artist_name: row.try_get("artist_name")?,
        play_count: row.try_get("play_count")?,
        liked: row.try_get::<i64, _>("liked")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Ids bound per `IN (...)` query, well under SQLite's bound-parameter limit
const FETCH_CHUNK: usize = 500;

/// Load songs by id on an open connection, in the order given.
///
/// Ids that do not exist are skipped.
pub(crate) async fn fetch_many(
    conn: &mut SqliteConnection,
    ids: &[SongId],
    viewer: Option<UserId>,
) -> Result<Vec<Song>> {
    let mut by_id: HashMap<SongId, Song> = HashMap::with_capacity(ids.len());

    for chunk in ids.chunks(FETCH_CHUNK) {
        let mut builder = QueryBuilder::new("");
        push_select(&mut builder, viewer);
        builder.push(" WHERE s.id IN (");
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        for row in builder.build().fetch_all(&mut *conn).await? {
            let song = song_from_row(&row)?;
            by_id.insert(song.id.clone(), song);
        }
    }

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Get songs by id as seen by `user_id`, preserving the order of `ids`
pub async fn get_many(pool: &SqlitePool, ids: &[SongId], user_id: UserId) -> Result<Vec<Song>> {
    let mut conn = pool.acquire().await?;
    fetch_many(&mut conn, ids, Some(user_id)).await
}

/// Get song by ID as seen by `user_id`
pub async fn get_by_id(pool: &SqlitePool, id: &SongId, user_id: UserId) -> Result<Option<Song>> {
    let mut conn = pool.acquire().await?;
    let mut songs = fetch_many(&mut conn, std::slice::from_ref(id), Some(user_id)).await?;
    Ok(songs.pop())
}

/// Check whether a song exists
pub async fn exists(pool: &SqlitePool, id: &SongId) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Get songs on an album, in disc and track order
pub async fn get_by_album(pool: &SqlitePool, album_id: AlbumId, user_id: UserId) -> Result<Vec<Song>> {
    let mut builder = QueryBuilder::new("");
    push_select(&mut builder, Some(user_id));
    builder.push(" WHERE s.album_id = ");
    builder.push_bind(album_id);
    builder.push(" ORDER BY s.disc, s.track, s.title, s.id");

    let rows = builder.build().fetch_all(pool).await?;
    Ok(rows.iter().map(song_from_row).collect::<std::result::Result<_, _>>()?)
}

/// Create new song
///
/// The returned song has no interactions yet.
pub async fn create(pool: &SqlitePool, song: CreateSong) -> Result<Song> {
    if !song.length.is_finite() || song.length < 0.0 {
        return Err(StorageError::invalid_input(format!(
            "song length must be a non-negative number of seconds, got {}",
            song.length
        )));
    }

    let id = SongId::generate();

    sqlx::query(
        r#"
        INSERT INTO songs (id, title, title_folded, length, track, disc, path, album_id, artist_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&song.title)
    .bind(fold_case(&song.title))
    .bind(song.length)
    .bind(song.track)
    .bind(song.disc)
    .bind(&song.path)
    .bind(song.album_id)
    .bind(song.artist_id)
    .execute(pool)
    .await?;

    tracing::debug!(song = %id, title = %song.title, "song created");

    let mut conn = pool.acquire().await?;
    fetch_many(&mut conn, std::slice::from_ref(&id), None)
        .await?
        .pop()
        .ok_or_else(|| StorageError::not_found("Song", &id))
}

/// Delete song
pub async fn delete(pool: &SqlitePool, id: &SongId) -> Result<()> {
    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Song", id));
    }

    Ok(())
}
