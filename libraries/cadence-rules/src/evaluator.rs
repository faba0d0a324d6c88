//! Execution seam
//!
//! A `CompiledExpression` is backend-agnostic; a catalogue implementation
//! renders it into its own query language and runs it.

use crate::expression::CompiledExpression;
use crate::query::{Pagination, SongSort};
use async_trait::async_trait;
use cadence_core::types::SongPage;
use chrono::{DateTime, Utc};

/// A song store able to run compiled smart playlist expressions
#[async_trait]
pub trait SongCatalogue: Send + Sync {
    type Error: Send;

    /// Evaluate with look-back windows anchored at `now`
    async fn evaluate_at(
        &self,
        expression: &CompiledExpression,
        sort: SongSort,
        page: Pagination,
        now: DateTime<Utc>,
    ) -> Result<SongPage, Self::Error>;

    /// Evaluate with look-back windows anchored at the current time
    async fn evaluate(
        &self,
        expression: &CompiledExpression,
        sort: SongSort,
        page: Pagination,
    ) -> Result<SongPage, Self::Error> {
        self.evaluate_at(expression, sort, page, Utc::now()).await
    }
}
