//! Song types

use super::{AlbumId, ArtistId, SongId};
use serde::{Deserialize, Serialize};

/// A song in the catalogue, as seen by one user
///
/// `play_count` and `liked` come from the requesting user's interaction
/// row and default to zero/false when the user never touched the song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    /// Duration in seconds
    pub length: f64,
    pub track: Option<i32>,
    pub disc: i32,
    pub path: String,
    pub album_id: AlbumId,
    pub album_name: String,  // Denormalized
    pub artist_id: ArtistId,
    pub artist_name: String, // Denormalized
    pub play_count: i64,
    pub liked: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSong {
    pub title: String,
    pub length: f64,
    pub track: Option<i32>,
    pub disc: i32,
    pub path: String,
    pub album_id: AlbumId,
    pub artist_id: ArtistId,
}

/// One page of an evaluated song list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongPage {
    pub songs: Vec<Song>,
    /// Matching songs across all pages
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl SongPage {
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self {
            songs: Vec::new(),
            total: 0,
            page,
            per_page,
        }
    }

    pub fn has_more(&self) -> bool {
        i64::from(self.page).saturating_mul(i64::from(self.per_page)) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, per_page: u32, total: i64) -> SongPage {
        SongPage {
            total,
            ..SongPage::empty(page, per_page)
        }
    }

    #[test]
    fn has_more_compares_against_total() {
        assert!(page(1, 10, 11).has_more());
        assert!(!page(2, 10, 20).has_more());
        assert!(!page(u32::MAX, u32::MAX, i64::MAX).has_more());
    }
}
