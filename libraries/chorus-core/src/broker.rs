//! External message broker seam used by multi-instance deployments

use crate::error::Result;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Stream of raw messages delivered on one broker channel
pub type MessageStream = BoxStream<'static, Vec<u8>>;

/// A channel-addressed broker shared by several server instances.
///
/// Delivery order within one channel is whatever FIFO guarantee the broker
/// provides; no ordering across channels or instances is assumed.
#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Publish one message to `channel`
    async fn publish(&self, channel: &str, message: Vec<u8>) -> Result<()>;

    /// Receive every message published to `channel` from now on.
    ///
    /// The stream never ends on its own; dropping it unsubscribes.
    async fn subscribe(&self, channel: &str) -> Result<MessageStream>;
}
