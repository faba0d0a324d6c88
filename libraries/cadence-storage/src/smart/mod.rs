//! Smart playlist evaluation
//!
//! Runs a validated [`CompiledExpression`] against the catalogue. The
//! count, the page of ids and the hydrated songs are all read inside one
//! read transaction, so `total` and `songs` describe the same snapshot.
//! Nothing here takes a write lock.

mod sql;

use crate::error::Result;
use crate::songs;
use cadence_core::types::{SongId, SongPage};
use cadence_rules::{CompiledExpression, Pagination, SongSort};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;

/// Evaluate with look-back windows anchored at the current time
pub async fn evaluate(
    pool: &SqlitePool,
    expression: &CompiledExpression,
    sort: SongSort,
    page: Pagination,
) -> Result<SongPage> {
    evaluate_at(pool, expression, sort, page, Utc::now()).await
}

/// Evaluate with look-back windows anchored at `now`
///
/// An expression that matches nothing returns an empty page without
/// touching the database.
pub async fn evaluate_at(
    pool: &SqlitePool,
    expression: &CompiledExpression,
    sort: SongSort,
    page: Pagination,
    now: DateTime<Utc>,
) -> Result<SongPage> {
    if expression.matches_nothing() {
        tracing::debug!(user = %expression.user_id, "smart playlist matches nothing");
        return Ok(SongPage::empty(page.page, page.per_page));
    }

    // Filter joins plus whatever the sort column needs
    let mut joins: BTreeSet<_> = expression.joins.clone();
    joins.extend(sort.field.join());

    let mut tx = pool.begin().await?;

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
    sql::push_from(&mut count, &expression.joins, expression.user_id);
    sql::push_where(&mut count, expression, now);
    let total: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

    let mut select = QueryBuilder::<Sqlite>::new("SELECT s.id");
    sql::push_from(&mut select, &joins, expression.user_id);
    sql::push_where(&mut select, expression, now);
    sql::push_order(&mut select, sort);
    select.push(" LIMIT ");
    select.push_bind(page.limit());
    select.push(" OFFSET ");
    select.push_bind(page.offset());
    let ids: Vec<SongId> = select.build_query_scalar().fetch_all(&mut *tx).await?;

    let songs = songs::fetch_many(&mut tx, &ids, Some(expression.user_id)).await?;

    tx.commit().await?;

    tracing::debug!(
        user = %expression.user_id,
        groups = expression.groups.len(),
        total,
        returned = songs.len(),
        page = page.page,
        "evaluated smart playlist"
    );

    Ok(SongPage {
        songs,
        total,
        page: page.page,
        per_page: page.per_page,
    })
}
