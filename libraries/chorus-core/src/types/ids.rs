/// ID types for Chorus entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is a well-formed UUID
            pub fn is_well_formed(&self) -> bool {
                Uuid::parse_str(&self.0).is_ok()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// User identifier
    UserId
);

string_id!(
    /// Song identifier
    SongId
);

string_id!(
    /// Playlist identifier
    PlaylistId
);

string_id!(
    /// Playlist entry (playlist/song join row) identifier
    EntryId
);

string_id!(
    /// Contributor row identifier
    ContributorId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_generation_creates_unique_ids() {
        let id1 = UserId::generate();
        let id2 = UserId::generate();
        assert_ne!(id1, id2);
        assert!(id1.is_well_formed());
    }

    #[test]
    fn song_id_from_string() {
        let id = SongId::new("song-123");
        assert_eq!(id.as_str(), "song-123");
        assert!(!id.is_well_formed());
    }

    #[test]
    fn playlist_id_display() {
        let id = PlaylistId::new("playlist-456");
        assert_eq!(format!("{}", id), "playlist-456");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = EntryId::new("e-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"e-1\"");
    }
}
