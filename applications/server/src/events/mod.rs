//! Topic-addressed event bus
//!
//! Mutations publish a [`PlaylistEvent`] on a [`Topic`] after their write
//! succeeds. Publishing is fire-and-forget; subscribers get every event
//! published on the exact topic after their subscription began. Two
//! backends implement [`EventBus`]:
//!
//! - [`InProcessEventBus`] for single-instance deployments
//! - [`BrokerEventBus`] for several instances sharing a [`chorus_core::Broker`]

pub mod broker;
pub mod memory;

pub use broker::BrokerEventBus;
pub use memory::InProcessEventBus;

use async_trait::async_trait;
use chorus_core::{
    error::Result, Contributor, Playlist, PlaylistEntry, PlaylistId, Role, SongId,
};
use futures_util::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;

/// Stream of events on one topic. Never ends on its own; drop to unsubscribe.
pub type EventStream = BoxStream<'static, PlaylistEvent>;

/// Kinds of per-playlist topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopicKind {
    PlaylistUpdated,
    SongAddedToPlaylist,
    SongRemovedFromPlaylist,
    ContributorAdded,
}

impl TopicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKind::PlaylistUpdated => "playlistUpdated",
            TopicKind::SongAddedToPlaylist => "songAddedToPlaylist",
            TopicKind::SongRemovedFromPlaylist => "songRemovedFromPlaylist",
            TopicKind::ContributorAdded => "contributorAdded",
        }
    }

    /// Role a subscriber must hold when an event is delivered
    pub fn minimum_role(&self) -> Role {
        Role::Viewer
    }
}

impl FromStr for TopicKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "playlistUpdated" => Ok(TopicKind::PlaylistUpdated),
            "songAddedToPlaylist" => Ok(TopicKind::SongAddedToPlaylist),
            "songRemovedFromPlaylist" => Ok(TopicKind::SongRemovedFromPlaylist),
            "contributorAdded" => Ok(TopicKind::ContributorAdded),
            other => Err(format!("unknown topic '{other}'")),
        }
    }
}

/// One event stream, scoped to a playlist
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    pub kind: TopicKind,
    pub playlist_id: PlaylistId,
}

impl Topic {
    pub fn new(kind: TopicKind, playlist_id: PlaylistId) -> Self {
        Self { kind, playlist_id }
    }

    /// String key, e.g. `songAddedToPlaylist:{playlistId}`
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.playlist_id)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.playlist_id)
    }
}

/// Payload of `songRemovedFromPlaylist`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedSong {
    pub playlist_id: PlaylistId,
    pub song_id: SongId,
}

/// Change notification published after a successful mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PlaylistEvent {
    PlaylistUpdated(Playlist),
    SongAddedToPlaylist(PlaylistEntry),
    SongRemovedFromPlaylist(RemovedSong),
    ContributorAdded(Contributor),
}

impl PlaylistEvent {
    pub fn kind(&self) -> TopicKind {
        match self {
            PlaylistEvent::PlaylistUpdated(_) => TopicKind::PlaylistUpdated,
            PlaylistEvent::SongAddedToPlaylist(_) => TopicKind::SongAddedToPlaylist,
            PlaylistEvent::SongRemovedFromPlaylist(_) => TopicKind::SongRemovedFromPlaylist,
            PlaylistEvent::ContributorAdded(_) => TopicKind::ContributorAdded,
        }
    }

    pub fn playlist_id(&self) -> &PlaylistId {
        match self {
            PlaylistEvent::PlaylistUpdated(playlist) => &playlist.id,
            PlaylistEvent::SongAddedToPlaylist(entry) => &entry.playlist_id,
            PlaylistEvent::SongRemovedFromPlaylist(removed) => &removed.playlist_id,
            PlaylistEvent::ContributorAdded(contributor) => &contributor.playlist_id,
        }
    }

    /// Topic this event is published on
    pub fn topic(&self) -> Topic {
        Topic::new(self.kind(), self.playlist_id().clone())
    }
}

/// Topic-addressed publish/subscribe
#[async_trait]
pub trait EventBus: Send + Sync + 'static {
    /// Publish without waiting for delivery. Failures are logged, not returned.
    fn publish(&self, topic: &Topic, event: PlaylistEvent);

    /// Start receiving events published on `topic` from now on
    async fn subscribe(&self, topic: &Topic) -> Result<EventStream>;
}

/// Keep only the events for which `predicate` resolves to `true`.
///
/// The predicate runs once per event at delivery time, so it sees the
/// world as it is when the event arrives rather than when the stream was
/// opened.
pub fn filtered_broadcast<F, Fut>(events: EventStream, predicate: F) -> EventStream
where
    F: FnMut(&PlaylistEvent) -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    events.filter(predicate).boxed()
}
