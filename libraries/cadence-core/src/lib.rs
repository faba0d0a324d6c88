//! Cadence Core
//!
//! Domain types and error handling shared by every Cadence crate.
//!
//! This crate provides the foundational building blocks used by the rule
//! compiler (`cadence-rules`) and the SQLite catalogue (`cadence-storage`).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Catalogue Types**: `Song`, `Album`, `Artist`, `Interaction`, `User`
//! - **Playlist Records**: `Playlist` and the persisted rule tree
//!   (`RuleGroupRecord`, `RuleRecord`, `FieldSpec`)
//! - **Error Handling**: Unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::types::{FieldSpec, RuleGroupRecord, RuleRecord};
//! use serde_json::json;
//!
//! let group = RuleGroupRecord::new(vec![RuleRecord::new(
//!     FieldSpec::name("artist.name"),
//!     "contains",
//!     vec![json!("Brien")],
//! )]);
//!
//! assert_eq!(group.rules.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use error::{CadenceError, Result};

pub use types::{
    Album, AlbumId, Artist, ArtistId, CreateAlbum, CreateArtist, CreatePlaylist, CreateSong,
    FieldDescriptor, FieldSpec, Interaction, Playlist, PlaylistId, RuleGroupRecord, RuleRecord,
    Song, SongId, SongPage, User, UserId,
};
