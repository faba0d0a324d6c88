use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::{interactions, playlists, smart, songs};
use async_trait::async_trait;
use cadence_core::types::*;
use cadence_rules::{CompiledExpression, ExpressionCache, Pagination, SongCatalogue, SongSort};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Local storage context using `SQLite`, acting for one user
///
/// Cheap to clone; [`for_user`](Self::for_user) gives a context for another
/// user that shares the pool and the expression cache.
#[derive(Clone)]
pub struct LocalStorageContext {
    pool: SqlitePool,
    user_id: UserId,
    cache: Arc<ExpressionCache>,
    default_per_page: u32,
    max_per_page: u32,
}

impl LocalStorageContext {
    pub fn new(pool: SqlitePool, user_id: UserId) -> Self {
        Self::with_config(pool, user_id, &StorageConfig::default())
    }

    pub fn with_config(pool: SqlitePool, user_id: UserId, config: &StorageConfig) -> Self {
        Self {
            pool,
            user_id,
            cache: Arc::new(ExpressionCache::new(config.expression_cache_size)),
            default_per_page: config.default_per_page,
            max_per_page: config.max_per_page,
        }
    }

    pub fn for_user(&self, user_id: UserId) -> Self {
        Self {
            user_id,
            ..self.clone()
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn cache(&self) -> &ExpressionCache {
        &self.cache
    }

    fn page(&self, page: Option<Pagination>) -> Pagination {
        page.unwrap_or_else(|| Pagination::new(1, self.default_per_page))
            .clamped(self.max_per_page)
    }

    // Playlists
    pub async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        playlists::get_user_playlists(&self.pool, self.user_id).await
    }

    pub async fn get_playlist(&self, id: PlaylistId) -> Result<Option<Playlist>> {
        playlists::get_by_id(&self.pool, id, self.user_id).await
    }

    pub async fn create_playlist(&self, name: &str, rules: Vec<RuleGroupRecord>) -> Result<Playlist> {
        playlists::create(
            &self.pool,
            CreatePlaylist {
                owner_id: self.user_id,
                name: name.to_string(),
                is_smart: true,
                rules,
            },
        )
        .await
    }

    /// Replace a smart playlist's rules and drop its cached expressions
    pub async fn update_playlist_rules(
        &self,
        id: PlaylistId,
        rules: Vec<RuleGroupRecord>,
    ) -> Result<Playlist> {
        let playlist = playlists::update_rules(&self.pool, id, self.user_id, rules).await?;
        self.cache.invalidate_playlist(id);
        Ok(playlist)
    }

    pub async fn rename_playlist(&self, id: PlaylistId, name: &str) -> Result<Playlist> {
        playlists::rename(&self.pool, id, self.user_id, name).await
    }

    pub async fn delete_playlist(&self, id: PlaylistId) -> Result<()> {
        playlists::delete(&self.pool, id, self.user_id).await?;
        self.cache.invalidate_playlist(id);
        Ok(())
    }

    // Smart playlists

    /// Compile (or reuse) a smart playlist's expression for this user
    pub async fn compiled_playlist(&self, id: PlaylistId) -> Result<Arc<CompiledExpression>> {
        let playlist = self
            .get_playlist(id)
            .await?
            .ok_or_else(|| StorageError::not_found("Playlist", id))?;

        if !playlist.is_smart {
            return Err(StorageError::invalid_input(format!(
                "playlist {id} is not a smart playlist"
            )));
        }

        Ok(self
            .cache
            .get_or_compile(id, &playlist.rules, self.user_id)?)
    }

    /// Songs currently matching a smart playlist
    ///
    /// Defaults to title order and the configured page size.
    pub async fn smart_playlist_songs(
        &self,
        id: PlaylistId,
        sort: Option<SongSort>,
        page: Option<Pagination>,
    ) -> Result<SongPage> {
        let expression = self.compiled_playlist(id).await?;
        smart::evaluate(&self.pool, &expression, sort.unwrap_or_default(), self.page(page)).await
    }

    /// Evaluate unsaved rules, e.g. to preview an edit
    ///
    /// Fails with every compile error before any query runs.
    pub async fn preview_rules(
        &self,
        rules: &[RuleGroupRecord],
        sort: Option<SongSort>,
        page: Option<Pagination>,
    ) -> Result<SongPage> {
        let expression = cadence_rules::compile_strict(rules, self.user_id)?;
        smart::evaluate(&self.pool, &expression, sort.unwrap_or_default(), self.page(page)).await
    }

    // Songs and interactions
    pub async fn get_song(&self, id: &SongId) -> Result<Option<Song>> {
        songs::get_by_id(&self.pool, id, self.user_id).await
    }

    pub async fn record_play(&self, song_id: &SongId) -> Result<Interaction> {
        interactions::record_play(&self.pool, self.user_id, song_id).await
    }

    pub async fn set_liked(&self, song_id: &SongId, liked: bool) -> Result<Interaction> {
        interactions::set_liked(&self.pool, self.user_id, song_id, liked).await
    }

    pub async fn recently_played(&self, limit: Option<u32>) -> Result<Vec<Song>> {
        let ids = interactions::recently_played(&self.pool, self.user_id, limit).await?;
        songs::get_many(&self.pool, &ids, self.user_id).await
    }

    pub async fn favorites(&self) -> Result<Vec<Song>> {
        interactions::favorites(&self.pool, self.user_id).await
    }
}

#[async_trait]
impl SongCatalogue for LocalStorageContext {
    type Error = StorageError;

    async fn evaluate_at(
        &self,
        expression: &CompiledExpression,
        sort: SongSort,
        page: Pagination,
        now: DateTime<Utc>,
    ) -> Result<SongPage> {
        smart::evaluate_at(&self.pool, expression, sort, page.clamped(self.max_per_page), now).await
    }
}
