/// Storage-specific errors
use cadence_rules::CompileErrors;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error from `SQLx`, surfaced unchanged
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Smart playlist rules failed to compile; nothing was evaluated
    #[error(transparent)]
    Rules(#[from] CompileErrors),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Entity exists but belongs to another user
    #[error("Permission denied")]
    PermissionDenied,

    /// Request is well-formed but not allowed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persisted JSON could not be read or written
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<config::ConfigError> for StorageError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<StorageError> for cadence_core::CadenceError {
    fn from(err: StorageError) -> Self {
        use cadence_core::CadenceError;

        match err {
            StorageError::Database(err) => CadenceError::from(err),
            StorageError::Rules(errors) => CadenceError::from(errors),
            StorageError::NotFound { entity, id } => CadenceError::NotFound { entity, id },
            StorageError::PermissionDenied => CadenceError::PermissionDenied,
            StorageError::InvalidInput(msg) => CadenceError::InvalidInput(msg),
            StorageError::Serialization(err) => CadenceError::Serialization(err),
            other => CadenceError::storage(other.to_string()),
        }
    }
}
