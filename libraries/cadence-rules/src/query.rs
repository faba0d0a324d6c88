//! Sorting and pagination requested by the caller of an evaluation

use crate::error::RuleError;
use crate::fields::Field;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Result ordering; song id always breaks ties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongSort {
    pub field: Field,
    pub direction: SortDirection,
}

impl SongSort {
    pub fn new(field: Field, direction: SortDirection) -> Result<Self, RuleError> {
        if !field.is_sortable() {
            return Err(RuleError::UnsortableField(field.name().to_string()));
        }
        Ok(Self { field, direction })
    }

    /// Resolve a sort request by field name
    pub fn by_name(name: &str, direction: SortDirection) -> Result<Self, RuleError> {
        Self::new(Field::resolve(name)?, direction)
    }
}

impl Default for SongSort {
    fn default() -> Self {
        Self {
            field: Field::SongTitle,
            direction: SortDirection::Asc,
        }
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Cap `per_page` at `max_per_page`
    pub fn clamped(self, max_per_page: u32) -> Self {
        Self::new(self.page, self.per_page.min(max_per_page))
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Rows to skip; saturates rather than overflowing for absurd pages
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)).saturating_mul(i64::from(self.per_page))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 50)
    }
}
