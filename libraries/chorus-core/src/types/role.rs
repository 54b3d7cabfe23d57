/// Contributor role hierarchy
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role granted to a contributor on a playlist.
///
/// Ordered: `Viewer < Editor < Admin`. Each role subsumes the permissions of
/// the roles below it. Playlist owners are always treated as `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Role {
    /// Can see the playlist and its songs
    Viewer = 0,
    /// Can add, remove and reorder songs and edit metadata
    Editor = 1,
    /// Can manage contributors
    Admin = 2,
}

impl Role {
    /// Position in the hierarchy
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Whether this role grants at least `required`
    pub fn satisfies(self, required: Role) -> bool {
        self.ordinal() >= required.ordinal()
    }

    /// Convert to string for database storage and the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "VIEWER",
            Role::Editor => "EDITOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEWER" => Ok(Role::Viewer),
            "EDITOR" => Ok(Role::Editor),
            "ADMIN" => Ok(Role::Admin),
            _ => Err("Role must be VIEWER, EDITOR, or ADMIN".to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
