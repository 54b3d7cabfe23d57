//! Chorus Server Library
//!
//! Collaborative playlist server: role-based access control, an ordered
//! soft-deletable song ledger, and live change events over WebSocket that
//! are re-authorized for every subscriber on delivery.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod middleware;
pub mod registry;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{EventBackend, ServerConfig};
pub use error::{Result, ServerError};
pub use events::{BrokerEventBus, EventBus, InProcessEventBus, PlaylistEvent, Topic, TopicKind};
pub use registry::{ConnectionRegistry, RegistryStats};
pub use services::{AccessControl, AuthService, PlaylistLedger, PlaylistService};
pub use state::AppState;
