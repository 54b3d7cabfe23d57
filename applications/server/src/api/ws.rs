//! WebSocket subscription transport
//!
//! A `graphql-transport-ws`-shaped JSON protocol: the client sends
//! `connection_init` (optionally carrying a bearer credential), then
//! `subscribe` / `complete` frames; the server answers with
//! `connection_ack`, `next` and `error` frames. Authorization is not
//! checked on subscribe; the registry filters every event on delivery.

use crate::events::{Topic, TopicKind};
use crate::registry::{ConnectionContext, ConnectionRegistry, Delivery};
use crate::state::AppState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use chorus_core::{requests::validate_playlist_id, ChorusError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long a client may take to send `connection_init`
pub const CONNECTION_INIT_TIMEOUT: Duration = Duration::from_secs(10);

pub const CLOSE_UNAUTHORIZED: u16 = 4401;
pub const CLOSE_FORBIDDEN: u16 = 4403;
pub const CLOSE_INIT_TIMEOUT: u16 = 4408;
pub const CLOSE_DUPLICATE_SUBSCRIPTION: u16 = 4409;

#[derive(Debug, Default, Deserialize)]
pub struct InitPayload {
    #[serde(default, alias = "Authorization")]
    pub authorization: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    pub topic: String,
    pub playlist_id: String,
}

/// Resolve a subscribe payload to the topic it names
pub fn resolve_topic(payload: &SubscribePayload) -> chorus_core::error::Result<Topic> {
    let kind = payload
        .topic
        .parse::<TopicKind>()
        .map_err(|_| ChorusError::invalid("topic", format!("Unknown topic: {}", payload.topic)))?;
    let playlist_id = validate_playlist_id(&payload.playlist_id)?;
    Ok(Topic::new(kind, playlist_id))
}

/// Frames sent by the client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(default)]
        payload: Option<InitPayload>,
    },
    Subscribe {
        id: String,
        payload: SubscribePayload,
    },
    Complete {
        id: String,
    },
    Ping,
    Pong,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

/// Frames sent by the server
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck,
    Next {
        id: String,
        payload: crate::events::PlaylistEvent,
    },
    Error {
        id: String,
        payload: Vec<ErrorPayload>,
    },
    Pong,
}

impl From<Delivery> for ServerMessage {
    fn from(delivery: Delivery) -> Self {
        ServerMessage::Next {
            id: delivery.subscription_id,
            payload: delivery.event,
        }
    }
}

/// GET /api/ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let registry = Arc::clone(&app_state.registry);
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

enum Init {
    Credential(Option<String>),
    Closed,
    Rejected,
}

async fn wait_for_init(socket: &mut WebSocket) -> Init {
    while let Some(Ok(message)) = socket.recv().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => return Init::Closed,
            _ => continue,
        };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::ConnectionInit { payload }) => {
                let credential = payload
                    .and_then(|p| p.authorization)
                    .filter(|c| !c.trim().is_empty());
                return Init::Credential(credential);
            }
            Ok(ClientMessage::Ping) => {
                if send(socket, &ServerMessage::Pong).await.is_err() {
                    return Init::Closed;
                }
            }
            Ok(ClientMessage::Pong) => {}
            _ => return Init::Rejected,
        }
    }
    Init::Closed
}

async fn handle_socket(mut socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let init = tokio::time::timeout(CONNECTION_INIT_TIMEOUT, wait_for_init(&mut socket)).await;
    let credential = match init {
        Err(_) => {
            close(socket, CLOSE_INIT_TIMEOUT, "Connection initialisation timeout").await;
            return;
        }
        Ok(Init::Closed) => return,
        Ok(Init::Rejected) => {
            close(socket, CLOSE_UNAUTHORIZED, "Unauthorized").await;
            return;
        }
        Ok(Init::Credential(credential)) => credential,
    };

    let context = match registry.on_connect(credential.as_deref()).await {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected subscription connection");
            close(socket, CLOSE_FORBIDDEN, "Forbidden").await;
            return;
        }
    };

    if send(&mut socket, &ServerMessage::ConnectionAck).await.is_ok() {
        run_connection(&mut socket, &registry, &context).await;
    }

    registry.on_disconnect(&context.id).await;
}

async fn run_connection(
    socket: &mut WebSocket,
    registry: &ConnectionRegistry,
    context: &ConnectionContext,
) {
    let (sink, mut deliveries) = mpsc::unbounded_channel::<Delivery>();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };

                let message = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::debug!(connection_id = %context.id, error = %e, "Ignoring malformed frame");
                        continue;
                    }
                };

                match message {
                    ClientMessage::Subscribe { id, payload } => {
                        let topic = match resolve_topic(&payload) {
                            Ok(topic) => topic,
                            Err(e) => {
                                let frame = ServerMessage::Error {
                                    id,
                                    payload: vec![ErrorPayload { code: e.code(), message: e.to_string() }],
                                };
                                if send(socket, &frame).await.is_err() {
                                    break;
                                }
                                continue;
                            }
                        };

                        match registry.on_subscribe(&context.id, &id, topic, sink.clone()).await {
                            Ok(()) => {}
                            Err(e) if e.code() == ErrorCode::Conflict => {
                                let reason = format!("Subscriber for {id} already exists");
                                close_in_place(socket, CLOSE_DUPLICATE_SUBSCRIPTION, reason).await;
                                break;
                            }
                            Err(e) => {
                                tracing::warn!(connection_id = %context.id, error = %e, "Subscription failed");
                                let frame = ServerMessage::Error {
                                    id,
                                    payload: vec![ErrorPayload {
                                        code: ErrorCode::InternalServerError,
                                        message: "Subscription failed".to_string(),
                                    }],
                                };
                                if send(socket, &frame).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    ClientMessage::Complete { id } => {
                        registry.on_unsubscribe(&context.id, &id).await;
                    }
                    ClientMessage::Ping => {
                        if send(socket, &ServerMessage::Pong).await.is_err() {
                            break;
                        }
                    }
                    ClientMessage::Pong | ClientMessage::ConnectionInit { .. } => {}
                }
            }
            Some(delivery) = deliveries.recv() => {
                if send(socket, &ServerMessage::from(delivery)).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn send(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode frame");
            return Ok(());
        }
    };
    socket.send(Message::Text(text)).await
}

async fn close_in_place(socket: &mut WebSocket, code: u16, reason: String) {
    let frame = CloseFrame {
        code,
        reason: Cow::Owned(reason),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "Close frame not delivered");
    }
}

async fn close(mut socket: WebSocket, code: u16, reason: &'static str) {
    close_in_place(&mut socket, code, reason.to_string()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PlaylistEvent, RemovedSong};
    use chorus_core::{PlaylistId, SongId};

    #[test]
    fn test_parses_connection_init() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"connection_init","payload":{"authorization":"Bearer abc"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::ConnectionInit { payload } => {
                assert_eq!(payload.unwrap().authorization.as_deref(), Some("Bearer abc"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let bare: ClientMessage = serde_json::from_str(r#"{"type":"connection_init"}"#).unwrap();
        assert!(matches!(bare, ClientMessage::ConnectionInit { payload: None }));
    }

    #[test]
    fn test_parses_subscribe() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"subscribe","id":"1","payload":{"topic":"songAddedToPlaylist","playlistId":"p"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::Subscribe { id, payload } => {
                assert_eq!(id, "1");
                assert_eq!(payload.topic, "songAddedToPlaylist");
                assert_eq!(payload.playlist_id, "p");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_resolve_topic() {
        let playlist_id = "6f2c1d0e-8a4b-4c3d-9e5f-0a1b2c3d4e5f";
        let payload = SubscribePayload {
            topic: "contributorAdded".to_string(),
            playlist_id: playlist_id.to_uppercase(),
        };
        let topic = resolve_topic(&payload).unwrap();
        assert_eq!(topic, Topic::new(TopicKind::ContributorAdded, PlaylistId::new(playlist_id)));
    }

    #[test]
    fn test_unknown_topic_is_a_validation_error() {
        // Still parses as a frame so the server can answer with an error
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"subscribe","id":"1","payload":{"topic":"everything","playlistId":"6f2c1d0e-8a4b-4c3d-9e5f-0a1b2c3d4e5f"}}"#,
        )
        .unwrap();
        let ClientMessage::Subscribe { payload, .. } = msg else {
            panic!("expected subscribe");
        };

        let err = resolve_topic(&payload).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.fields()[0].field, "topic");
    }

    #[test]
    fn test_bad_playlist_id_is_a_validation_error() {
        let payload = SubscribePayload {
            topic: "playlistUpdated".to_string(),
            playlist_id: "not-a-uuid".to_string(),
        };
        let err = resolve_topic(&payload).unwrap_err();
        assert_eq!(err.fields()[0].field, "playlistId");
    }

    #[test]
    fn test_next_frame_shape() {
        let delivery = Delivery {
            subscription_id: "7".to_string(),
            event: PlaylistEvent::SongRemovedFromPlaylist(RemovedSong {
                playlist_id: PlaylistId::new("p"),
                song_id: SongId::new("s"),
            }),
        };
        let json = serde_json::to_value(ServerMessage::from(delivery)).unwrap();
        assert_eq!(json["type"], "next");
        assert_eq!(json["id"], "7");
        assert_eq!(json["payload"]["type"], "songRemovedFromPlaylist");
        assert_eq!(json["payload"]["data"]["playlistId"], "p");

        let ack = serde_json::to_value(ServerMessage::ConnectionAck).unwrap();
        assert_eq!(ack, serde_json::json!({"type": "connection_ack"}));
    }
}
