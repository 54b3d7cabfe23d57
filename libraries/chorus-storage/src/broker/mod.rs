//! Outbox-table broker
//!
//! Every instance sharing one database publishes by appending to
//! `broker_messages`. Each instance runs at most one poller per channel,
//! which reads rows appended after the cursor and fans them out to the
//! local subscribers of that channel. A poller stops once its channel has
//! no subscribers left.

use async_trait::async_trait;
use chorus_core::{error::Result, Broker, MessageStream};
use chrono::{DateTime, Utc};
use futures_util::stream;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

const BATCH_SIZE: i64 = 256;

/// One local subscriber; receives rows with `id > from_id`
struct Subscriber {
    from_id: i64,
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

type Channels = Mutex<HashMap<String, Vec<Subscriber>>>;

/// Broker backed by the `broker_messages` table
#[derive(Clone)]
pub struct SqliteBroker {
    pool: SqlitePool,
    poll_interval: Duration,
    channels: Arc<Channels>,
}

impl SqliteBroker {
    pub fn new(pool: SqlitePool, poll_interval: Duration) -> Self {
        Self {
            pool,
            poll_interval,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Delete messages published before `cutoff`. Returns the number of rows removed.
    pub async fn prune(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM broker_messages WHERE published_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Number of channels with a running poller on this instance
    pub async fn active_channels(&self) -> usize {
        self.channels.lock().await.len()
    }

    async fn high_water_mark(&self, channel: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COALESCE(MAX(id), 0) AS last_id FROM broker_messages WHERE channel = ?")
            .bind(channel)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("last_id")?)
    }
}

struct Poller {
    pool: SqlitePool,
    channel: String,
    last_id: i64,
    poll_interval: Duration,
    channels: Arc<Channels>,
}

impl Poller {
    async fn fetch(&mut self) -> Result<Vec<(i64, Vec<u8>)>> {
        let rows = sqlx::query(
            r#"
            SELECT id, payload
            FROM broker_messages
            WHERE channel = ? AND id > ?
            ORDER BY id
            LIMIT ?
            "#,
        )
        .bind(&self.channel)
        .bind(self.last_id)
        .bind(BATCH_SIZE)
        .fetch_all(&self.pool)
        .await?;

        let mut batch = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            batch.push((id, row.try_get("payload")?));
            self.last_id = id;
        }

        Ok(batch)
    }

    async fn run(mut self) {
        loop {
            tokio::time::sleep(self.poll_interval).await;

            let batch = match self.fetch().await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(channel = %self.channel, error = %e, "Broker poll failed");
                    Vec::new()
                }
            };

            let mut channels = self.channels.lock().await;
            let Some(subscribers) = channels.get_mut(&self.channel) else {
                return;
            };

            for (id, payload) in &batch {
                subscribers.retain(|sub| {
                    sub.from_id >= *id || sub.tx.send(payload.clone()).is_ok()
                });
            }
            subscribers.retain(|sub| !sub.tx.is_closed());

            if subscribers.is_empty() {
                channels.remove(&self.channel);
                tracing::debug!(channel = %self.channel, "Broker poller stopped");
                return;
            }
        }
    }
}

#[async_trait]
impl Broker for SqliteBroker {
    async fn publish(&self, channel: &str, message: Vec<u8>) -> Result<()> {
        sqlx::query("INSERT INTO broker_messages (channel, payload, published_at) VALUES (?, ?, ?)")
            .bind(channel)
            .bind(message)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<MessageStream> {
        let (tx, rx) = mpsc::unbounded_channel();

        // Held across the high-water-mark read so the poller cannot deliver
        // rows between that read and registration
        let mut channels = self.channels.lock().await;
        let from_id = self.high_water_mark(channel).await?;

        match channels.get_mut(channel) {
            Some(subscribers) => subscribers.push(Subscriber { from_id, tx }),
            None => {
                channels.insert(channel.to_string(), vec![Subscriber { from_id, tx }]);
                let poller = Poller {
                    pool: self.pool.clone(),
                    channel: channel.to_string(),
                    last_id: from_id,
                    poll_interval: self.poll_interval,
                    channels: Arc::clone(&self.channels),
                };
                tokio::spawn(poller.run());
                tracing::debug!(channel, from_id, "Broker poller started");
            }
        }
        drop(channels);

        tracing::debug!(channel, from_id, "Broker subscription opened");

        let messages = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|message| (message, rx))
        });

        Ok(Box::pin(messages))
    }
}
