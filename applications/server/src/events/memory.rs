//! In-process event bus

use super::{EventBus, EventStream, PlaylistEvent, Topic};
use async_trait::async_trait;
use chorus_core::error::Result;
use futures_util::{Stream, StreamExt};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

type Senders = Mutex<HashMap<String, Vec<mpsc::UnboundedSender<PlaylistEvent>>>>;

/// Fan-out over per-subscriber unbounded channels.
///
/// Delivery order per topic is publish order. A subscriber that stops
/// reading never slows the publisher down. Dropping a subscription removes
/// its sender, and the topic itself once nobody listens.
#[derive(Default)]
pub struct InProcessEventBus {
    topics: Arc<Senders>,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriber channels on `topic`
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        let topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics
            .get(&topic.key())
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }

    /// Number of topics with at least one registered subscriber
    pub fn topic_count(&self) -> usize {
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Receiving end of one subscription; unregisters itself on drop
struct Subscription {
    events: UnboundedReceiverStream<PlaylistEvent>,
    topics: Arc<Senders>,
    key: String,
}

impl Stream for Subscription {
    type Item = PlaylistEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Closing first makes our own sender report `is_closed`
        self.events.close();

        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(senders) = topics.get_mut(&self.key) {
            senders.retain(|tx| !tx.is_closed());
            if senders.is_empty() {
                topics.remove(&self.key);
            }
        }
    }
}

#[async_trait]
impl EventBus for InProcessEventBus {
    fn publish(&self, topic: &Topic, event: PlaylistEvent) {
        let key = topic.key();
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(senders) = topics.get_mut(&key) {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
            if senders.is_empty() {
                topics.remove(&key);
            }
        }
    }

    async fn subscribe(&self, topic: &Topic) -> Result<EventStream> {
        let key = topic.key();
        let (tx, rx) = mpsc::unbounded_channel();
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .push(tx);

        Ok(Subscription {
            events: UnboundedReceiverStream::new(rx),
            topics: Arc::clone(&self.topics),
            key,
        }
        .boxed())
    }
}
