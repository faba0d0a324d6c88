/// User domain type
use super::UserId;
use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Account creation timestamp
    pub created_at: String,
}
