//! Album types

use super::ArtistId;
use serde::{Deserialize, Serialize};

pub type AlbumId = i64;

/// An album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub artist_id: ArtistId,
    pub artist_name: Option<String>, // Denormalized
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlbum {
    pub name: String,
    pub artist_id: ArtistId,
}
