//! Broker-backed event bus for multi-instance deployments

use super::{EventBus, EventStream, PlaylistEvent, Topic};
use async_trait::async_trait;
use chorus_core::{error::Result, Broker};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Broker channel carrying a topic
pub fn channel_name(topic: &Topic) -> String {
    format!("chorus:{}", topic.key())
}

/// Event bus relaying JSON-encoded events through a [`Broker`].
///
/// Publishes are queued to a single background task so one instance hands
/// its events to the broker in publish order. Ordering across instances is
/// whatever the broker provides.
pub struct BrokerEventBus<B: Broker> {
    broker: Arc<B>,
    outbound: mpsc::UnboundedSender<(String, Vec<u8>)>,
}

impl<B: Broker> BrokerEventBus<B> {
    /// Create the bus and spawn its publisher task. Must be called inside a
    /// Tokio runtime.
    pub fn new(broker: Arc<B>) -> Self {
        let (outbound, mut queue) = mpsc::unbounded_channel::<(String, Vec<u8>)>();

        let publisher = Arc::clone(&broker);
        tokio::spawn(async move {
            while let Some((channel, payload)) = queue.recv().await {
                if let Err(e) = publisher.publish(&channel, payload).await {
                    tracing::warn!(channel = %channel, error = %e, "Broker publish failed");
                }
            }
        });

        Self { broker, outbound }
    }
}

#[async_trait]
impl<B: Broker> EventBus for BrokerEventBus<B> {
    fn publish(&self, topic: &Topic, event: PlaylistEvent) {
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Failed to encode event");
                return;
            }
        };

        if self.outbound.send((channel_name(topic), payload)).is_err() {
            tracing::warn!(topic = %topic, "Broker publisher task has stopped");
        }
    }

    async fn subscribe(&self, topic: &Topic) -> Result<EventStream> {
        let channel = channel_name(topic);
        let messages = self.broker.subscribe(&channel).await?;

        let events = messages.filter_map(move |bytes| {
            let decoded = serde_json::from_slice::<PlaylistEvent>(&bytes);
            let channel = channel.clone();
            async move {
                match decoded {
                    Ok(event) => Some(event),
                    Err(e) => {
                        tracing::warn!(channel = %channel, error = %e, "Skipping undecodable broker message");
                        None
                    }
                }
            }
        });

        Ok(events.boxed())
    }
}
