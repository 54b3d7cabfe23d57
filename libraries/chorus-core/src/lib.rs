//! Chorus Core
//!
//! Platform-agnostic domain types, traits and error handling for Chorus,
//! the collaborative playlist service.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Song`, `Playlist`, `PlaylistEntry`, `Contributor`
//! - **Role hierarchy**: `Role` (`VIEWER < EDITOR < ADMIN`)
//! - **Seams**: `CollectionStore` (durable store), `Broker` (external
//!   message broker), `TokenVerifier` (credential verification)
//! - **Requests**: validated per-operation request types
//! - **Error Handling**: unified `ChorusError` with stable `ErrorCode`s
//!
//! # Example
//!
//! ```rust
//! use chorus_core::types::Role;
//!
//! assert!(Role::Admin.satisfies(Role::Editor));
//! assert!(!Role::Viewer.satisfies(Role::Editor));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod broker;
pub mod error;
pub mod principal;
pub mod requests;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use broker::{Broker, MessageStream};
pub use error::{ChorusError, ErrorCode, FieldError, Result};
pub use principal::{Principal, TokenVerifier};
pub use storage::CollectionStore;

pub use types::{
    Contributor, ContributorId, CreatePlaylist, CreateSong, CreateUser, EntryId, EntryState,
    NewContributor, Playlist, PlaylistEntry, PlaylistId, RecordState, Role, Song, SongId,
    UpdatePlaylist, User, UserId,
};
