mod album;
mod artist;
mod ids;
mod interaction;
mod playlist;
mod song;
mod user;

pub use album::{Album, AlbumId, CreateAlbum};
pub use artist::{Artist, ArtistId, CreateArtist};
pub use ids::{PlaylistId, SongId, UserId};
pub use interaction::Interaction;
pub use playlist::{
    CreatePlaylist, FieldDescriptor, FieldSpec, Playlist, RuleGroupRecord, RuleRecord,
};
pub use song::{CreateSong, Song, SongPage};
pub use user::User;
