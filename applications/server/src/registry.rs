//! Live subscriber connections and their subscriptions
//!
//! Connections move through `Connecting -> Authenticated | Anonymous ->
//! Active -> Disconnected`. Every subscription runs a forwarding task that
//! pulls from the event bus, re-checks authorization for each event and
//! pushes survivors into the connection's outbound channel.

use crate::events::{filtered_broadcast, EventBus, PlaylistEvent, Topic};
use crate::services::AccessControl;
use chorus_core::{error::Result, ChorusError, Principal, TokenVerifier};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Identity of one live connection
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub id: ConnectionId,
    pub principal: Option<Principal>,
    pub connected_at: DateTime<Utc>,
}

impl ConnectionContext {
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// An event addressed to one subscription of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub subscription_id: String,
    pub event: PlaylistEvent,
}

/// Counts for operational visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub connections: usize,
    pub subscriptions: usize,
}

struct ConnectionEntry {
    context: ConnectionContext,
    subscriptions: HashMap<String, JoinHandle<()>>,
}

impl ConnectionEntry {
    fn abort_all(self) -> usize {
        let count = self.subscriptions.len();
        for (_, task) in self.subscriptions {
            task.abort();
        }
        count
    }
}

/// Whether `principal` may currently see events on `topic`.
///
/// Anonymous connections never receive playlist events.
pub async fn authorized_for_topic(
    access: &AccessControl,
    topic: &Topic,
    principal: Option<&Principal>,
) -> bool {
    let Some(principal) = principal else {
        return false;
    };

    access
        .resolve_access(
            &topic.playlist_id,
            &principal.id,
            Some(topic.kind.minimum_role()),
        )
        .await
        .is_ok()
}

pub struct ConnectionRegistry {
    verifier: Arc<dyn TokenVerifier>,
    access: AccessControl,
    bus: Arc<dyn EventBus>,
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        access: AccessControl,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            verifier,
            access,
            bus,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Register a connection.
    ///
    /// A supplied credential must verify; an invalid one rejects the
    /// connection with `Unauthenticated`. No credential means anonymous.
    pub async fn on_connect(&self, credential: Option<&str>) -> Result<ConnectionContext> {
        let principal = match credential {
            Some(credential) => Some(self.verifier.resolve_token(credential)?),
            None => None,
        };

        let context = ConnectionContext {
            id: Uuid::new_v4(),
            principal,
            connected_at: Utc::now(),
        };

        self.connections.lock().await.insert(
            context.id,
            ConnectionEntry {
                context: context.clone(),
                subscriptions: HashMap::new(),
            },
        );

        tracing::info!(
            connection_id = %context.id,
            authenticated = context.is_authenticated(),
            "Connection registered"
        );

        Ok(context)
    }

    /// Subscribe a connection to `topic`, forwarding authorized events to `sink`.
    ///
    /// No authorization happens here; every event is checked when it is
    /// delivered. Reusing a live subscription id fails with `Conflict`.
    pub async fn on_subscribe(
        &self,
        connection_id: &ConnectionId,
        subscription_id: &str,
        topic: Topic,
        sink: mpsc::UnboundedSender<Delivery>,
    ) -> Result<()> {
        let principal = {
            let connections = self.connections.lock().await;
            let entry = connections
                .get(connection_id)
                .ok_or_else(|| ChorusError::not_found("Connection", connection_id.to_string()))?;
            if entry.subscriptions.contains_key(subscription_id) {
                return Err(ChorusError::conflict(format!(
                    "Subscriber for {subscription_id} already exists"
                )));
            }
            entry.context.principal.clone()
        };

        let events = self.bus.subscribe(&topic).await?;

        let access = self.access.clone();
        let gate_topic = topic.clone();
        let mut authorized = filtered_broadcast(events, move |_event| {
            let access = access.clone();
            let topic = gate_topic.clone();
            let principal = principal.clone();
            async move {
                let allowed = authorized_for_topic(&access, &topic, principal.as_ref()).await;
                if !allowed {
                    tracing::debug!(topic = %topic, "Dropping event for unauthorized subscriber");
                }
                allowed
            }
        });

        let delivery_id = subscription_id.to_string();
        let task = tokio::spawn(async move {
            while let Some(event) = authorized.next().await {
                let delivery = Delivery {
                    subscription_id: delivery_id.clone(),
                    event,
                };
                if sink.send(delivery).is_err() {
                    break;
                }
            }
        });

        let mut connections = self.connections.lock().await;
        let Some(entry) = connections.get_mut(connection_id) else {
            // Disconnected while the bus subscription was being set up
            task.abort();
            return Err(ChorusError::not_found(
                "Connection",
                connection_id.to_string(),
            ));
        };
        if entry.subscriptions.contains_key(subscription_id) {
            task.abort();
            return Err(ChorusError::conflict(format!(
                "Subscriber for {subscription_id} already exists"
            )));
        }
        entry
            .subscriptions
            .insert(subscription_id.to_string(), task);

        tracing::info!(
            connection_id = %connection_id,
            subscription_id,
            topic = %topic,
            "Subscription registered"
        );

        Ok(())
    }

    /// Stop one subscription. Returns whether it existed.
    pub async fn on_unsubscribe(&self, connection_id: &ConnectionId, subscription_id: &str) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections
            .get_mut(connection_id)
            .and_then(|entry| entry.subscriptions.remove(subscription_id));

        match removed {
            Some(task) => {
                task.abort();
                tracing::debug!(connection_id = %connection_id, subscription_id, "Subscription completed");
                true
            }
            None => false,
        }
    }

    /// Drop a connection and every subscription it owned. Safe to call twice.
    pub async fn on_disconnect(&self, connection_id: &ConnectionId) {
        let removed = self.connections.lock().await.remove(connection_id);

        if let Some(entry) = removed {
            let connected_for = Utc::now() - entry.context.connected_at;
            let subscriptions = entry.abort_all();
            tracing::info!(
                connection_id = %connection_id,
                subscriptions,
                connected_secs = connected_for.num_seconds(),
                "Connection disconnected"
            );
        }
    }

    /// Current number of live connections and subscriptions
    pub async fn stats(&self) -> RegistryStats {
        let connections = self.connections.lock().await;
        RegistryStats {
            connections: connections.len(),
            subscriptions: connections.values().map(|e| e.subscriptions.len()).sum(),
        }
    }
}
