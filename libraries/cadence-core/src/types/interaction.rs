//! Per-user listening data

use super::{SongId, UserId};
use serde::{Deserialize, Serialize};

/// One user's interaction with one song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub song_id: SongId,
    pub liked: bool,
    pub play_count: i64,
    pub created_at: String,
    /// Touched on every play or like change
    pub updated_at: String,
}
