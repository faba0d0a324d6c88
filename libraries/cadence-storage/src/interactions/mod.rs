//! Per-user song interactions
//!
//! One row per (user, song). Playing a song bumps `play_count` and
//! `updated_at`; liking only flips `liked`.

use crate::error::{Result, StorageError};
use crate::songs;
use cadence_core::types::{Interaction, Song, SongId, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn interaction_from_row(row: &SqliteRow) -> std::result::Result<Interaction, sqlx::Error> {
    Ok(Interaction {
        user_id: row.try_get("user_id")?,
        song_id: row.try_get("song_id")?,
        liked: row.try_get::<i64, _>("liked")? != 0,
        play_count: row.try_get("play_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn ensure_song(pool: &SqlitePool, song_id: &SongId) -> Result<()> {
    if songs::exists(pool, song_id).await? {
        Ok(())
    } else {
        Err(StorageError::not_found("Song", song_id))
    }
}

/// Get a user's interaction with a song
pub async fn get(pool: &SqlitePool, user_id: UserId, song_id: &SongId) -> Result<Option<Interaction>> {
    let row = sqlx::query(
        r#"
        SELECT user_id, song_id, liked, play_count, created_at, updated_at
        FROM interactions
        WHERE user_id = ? AND song_id = ?
        "#,
    )
    .bind(user_id)
    .bind(song_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(interaction_from_row).transpose()?)
}

/// Record one play of a song by a user
pub async fn record_play(pool: &SqlitePool, user_id: UserId, song_id: &SongId) -> Result<Interaction> {
    ensure_song(pool, song_id).await?;

    sqlx::query(
        r#"
        INSERT INTO interactions (user_id, song_id, play_count)
        VALUES (?, ?, 1)
        ON CONFLICT(user_id, song_id)
        DO UPDATE SET play_count = play_count + 1, updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(song_id)
    .execute(pool)
    .await?;

    tracing::trace!(user = %user_id, song = %song_id, "play recorded");

    get(pool, user_id, song_id)
        .await?
        .ok_or_else(|| StorageError::not_found("Interaction", song_id))
}

/// Like or unlike a song
pub async fn set_liked(
    pool: &SqlitePool,
    user_id: UserId,
    song_id: &SongId,
    liked: bool,
) -> Result<Interaction> {
    ensure_song(pool, song_id).await?;

    sqlx::query(
        r#"
        INSERT INTO interactions (user_id, song_id, liked)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id, song_id)
        DO UPDATE SET liked = excluded.liked
        "#,
    )
    .bind(user_id)
    .bind(song_id)
    .bind(liked)
    .execute(pool)
    .await?;

    get(pool, user_id, song_id)
        .await?
        .ok_or_else(|| StorageError::not_found("Interaction", song_id))
}

/// Ids of the songs a user played, most recent first
pub async fn recently_played(
    pool: &SqlitePool,
    user_id: UserId,
    limit: Option<u32>,
) -> Result<Vec<SongId>> {
    // LIMIT -1 means no limit in SQLite
    let limit = limit.map_or(-1, i64::from);

    let ids = sqlx::query_scalar(
        r#"
        SELECT song_id FROM interactions
        WHERE user_id = ? AND play_count > 0
        ORDER BY updated_at DESC, song_id ASC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Songs a user liked, ordered by title
pub async fn favorites(pool: &SqlitePool, user_id: UserId) -> Result<Vec<Song>> {
    let ids: Vec<SongId> = sqlx::query_scalar(
        r#"
        SELECT i.song_id FROM interactions i
        INNER JOIN songs s ON s.id = i.song_id
        WHERE i.user_id = ? AND i.liked = 1
        ORDER BY s.title_folded, s.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    songs::get_many(pool, &ids, user_id).await
}
