/// Server services
pub mod access;
pub mod auth;
pub mod ledger;
pub mod playlists;

pub use access::{AccessControl, AccessGrant};
pub use auth::AuthService;
pub use ledger::PlaylistLedger;
pub use playlists::PlaylistService;
