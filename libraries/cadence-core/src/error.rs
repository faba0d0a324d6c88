/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CadenceError`
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Core error type for Cadence
#[derive(Error, Debug)]
pub enum CadenceError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Permission denied
    #[error("Permission denied")]
    PermissionDenied,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// One or more smart playlist rules failed to compile
    #[error("Invalid smart playlist rules: {0}")]
    InvalidRules(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl CadenceError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CadenceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        let err = CadenceError::NotFound {
            entity: "Playlist".to_string(),
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Playlist not found: 42");
        assert_eq!(CadenceError::storage("disk full").to_string(), "Storage error: disk full");
    }
}
