//! Domain types for Chorus

pub mod contributor;
pub mod entry;
pub mod ids;
pub mod lifecycle;
pub mod playlist;
pub mod role;
pub mod song;
pub mod user;

pub use contributor::{Contributor, NewContributor};
pub use entry::PlaylistEntry;
pub use ids::{ContributorId, EntryId, PlaylistId, SongId, UserId};
pub use lifecycle::{EntryState, RecordState};
pub use playlist::{CreatePlaylist, Playlist, UpdatePlaylist};
pub use role::Role;
pub use song::{CreateSong, Song};
pub use user::{CreateUser, User};
