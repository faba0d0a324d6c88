//! Playlists and their smart playlist rules
//!
//! Rule groups are stored as a JSON array on the playlist row. They are
//! compiled with `compile_strict` before every write, so a stored smart
//! playlist always holds rules that compiled when they were saved.
//!
//! Reads are owner-only: another user's playlist reads as absent, and
//! writes to it fail with `PermissionDenied`.

use crate::error::{Result, StorageError};
use cadence_core::types::{CreatePlaylist, Playlist, PlaylistId, RuleGroupRecord, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const SELECT_PLAYLIST: &str = r#"
    SELECT id, owner_id, name, is_smart, rules, created_at, updated_at
    FROM playlists
"#;

fn playlist_from_row(row: &SqliteRow) -> Result<Playlist> {
    let rules: String = row.try_get("rules")?;

    Ok(Playlist {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        is_smart: row.try_get::<i64, _>("is_smart")? != 0,
        rules: serde_json::from_str(&rules)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::invalid_input("playlist name cannot be empty"));
    }
    Ok(name)
}

/// Reject rules that would not compile for the owner
fn validate_rules(rules: &[RuleGroupRecord], owner_id: UserId) -> Result<()> {
    cadence_rules::compile_strict(rules, owner_id)?;
    Ok(())
}

async fn fetch(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!("{SELECT_PLAYLIST} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(playlist_from_row).transpose()
}

/// Load a playlist for modification by its owner
async fn fetch_owned(pool: &SqlitePool, id: PlaylistId, user_id: UserId) -> Result<Playlist> {
    let playlist = fetch(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Playlist", id))?;

    if playlist.owner_id != user_id {
        return Err(StorageError::PermissionDenied);
    }

    Ok(playlist)
}

/// Get user's playlists, newest first
pub async fn get_user_playlists(pool: &SqlitePool, user_id: UserId) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(&format!(
        "{SELECT_PLAYLIST} WHERE owner_id = ? ORDER BY updated_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(playlist_from_row).collect()
}

/// Get playlist by ID (owner only)
pub async fn get_by_id(
    pool: &SqlitePool,
    id: PlaylistId,
    user_id: UserId,
) -> Result<Option<Playlist>> {
    Ok(fetch(pool, id)
        .await?
        .filter(|playlist| playlist.owner_id == user_id))
}

/// Create new playlist
///
/// Smart playlists must carry rules that compile; plain playlists must
/// carry none.
pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<Playlist> {
    let name = validate_name(&playlist.name)?;

    if playlist.is_smart {
        validate_rules(&playlist.rules, playlist.owner_id)?;
    } else if !playlist.rules.is_empty() {
        return Err(StorageError::invalid_input(
            "only smart playlists can have rules",
        ));
    }

    let rules = serde_json::to_string(&playlist.rules)?;

    let id = sqlx::query(
        r#"
        INSERT INTO playlists (owner_id, name, is_smart, rules)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(playlist.owner_id)
    .bind(name)
    .bind(playlist.is_smart)
    .bind(rules)
    .execute(pool)
    .await?
    .last_insert_rowid();

    tracing::debug!(
        playlist = id,
        owner = %playlist.owner_id,
        smart = playlist.is_smart,
        groups = playlist.rules.len(),
        "playlist created"
    );

    fetch(pool, PlaylistId::new(id))
        .await?
        .ok_or_else(|| StorageError::not_found("Playlist", id))
}

/// Replace a smart playlist's rules
///
/// Nothing is written if any rule fails to compile. Callers holding a
/// compiled-expression cache must invalidate the playlist afterwards.
pub async fn update_rules(
    pool: &SqlitePool,
    id: PlaylistId,
    user_id: UserId,
    rules: Vec<RuleGroupRecord>,
) -> Result<Playlist> {
    let playlist = fetch_owned(pool, id, user_id).await?;

    if !playlist.is_smart {
        return Err(StorageError::invalid_input(format!(
            "playlist {id} is not a smart playlist"
        )));
    }

    validate_rules(&rules, playlist.owner_id)?;

    sqlx::query("UPDATE playlists SET rules = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(serde_json::to_string(&rules)?)
        .bind(id)
        .execute(pool)
        .await?;

    tracing::debug!(playlist = %id, groups = rules.len(), "smart playlist rules updated");

    fetch(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Playlist", id))
}

/// Rename playlist
pub async fn rename(
    pool: &SqlitePool,
    id: PlaylistId,
    user_id: UserId,
    name: &str,
) -> Result<Playlist> {
    let name = validate_name(name)?;
    fetch_owned(pool, id, user_id).await?;

    sqlx::query("UPDATE playlists SET name = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;

    fetch(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Playlist", id))
}

/// Delete playlist (owner only)
pub async fn delete(pool: &SqlitePool, id: PlaylistId, user_id: UserId) -> Result<()> {
    fetch_owned(pool, id, user_id).await?;

    sqlx::query("DELETE FROM playlists WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    tracing::debug!(playlist = %id, "playlist deleted");
    Ok(())
}
