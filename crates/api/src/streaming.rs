//! WebSocket streaming of leaderboard events.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use crate::middleware::AppState;

/// Per-channel fan-out of serialized event payloads.
///
/// Subscribers are unbounded mpsc senders keyed by a connection id. Dead
/// senders are pruned on publish and empty channels are dropped from the
/// map, so the registry shrinks back as viewers disconnect.
#[derive(Clone, Default)]
pub struct Broadcaster {
    channels: Arc<RwLock<HashMap<String, HashMap<u64, mpsc::UnboundedSender<String>>>>>,
    next_id: Arc<AtomicU64>,
}

/// Handle for one subscriber.
pub struct Subscription {
    pub channel: String,
    pub id: u64,
    pub rx: mpsc::UnboundedReceiver<String>,
}

impl Broadcaster {
    /// Create a new broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber on `channel`.
    pub async fn subscribe(&self, channel: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut channels = self.channels.write().await;
        channels.entry(channel.to_string()).or_default().insert(id, tx);

        Subscription {
            channel: channel.to_string(),
            id,
            rx,
        }
    }

    /// Remove a subscriber, dropping the channel entry when it empties.
    pub async fn unsubscribe(&self, channel: &str, id: u64) {
        let mut channels = self.channels.write().await;
        if let Some(subscribers) = channels.get_mut(channel) {
            subscribers.remove(&id);
            if subscribers.is_empty() {
                channels.remove(channel);
            }
        }
    }

    /// Deliver `payload` to every live subscriber of `channel`.
    ///
    /// Returns the number of subscribers reached.
    pub async fn publish(&self, channel: &str, payload: &str) -> usize {
        let mut channels = self.channels.write().await;
        let Some(subscribers) = channels.get_mut(channel) else {
            return 0;
        };

        subscribers.retain(|_, tx| tx.send(payload.to_string()).is_ok());
        let delivered = subscribers.len();
        if subscribers.is_empty() {
            channels.remove(channel);
        }
        delivered
    }

    /// Number of channels with at least one subscriber.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

/// Streaming query parameters.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Channel to subscribe to, e.g. `poll:cabinet`.
    pub channel: String,
}

/// WebSocket handler for streaming.
pub async fn streaming_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<StreamQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, query.channel, state.broadcaster.clone()))
}

async fn handle_socket(socket: WebSocket, channel: String, broadcaster: Broadcaster) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscription = broadcaster.subscribe(&channel).await;

    info!(channel = %channel, id = subscription.id, "streaming connection established");

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(channel = %channel, error = %e, "websocket error");
                        break;
                    }
                }
            }
            outgoing = subscription.rx.recv() => {
                match outgoing {
                    Some(payload) => {
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    broadcaster.unsubscribe(&channel, subscription.id).await;
    info!(channel = %channel, id = subscription.id, "streaming connection closed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let broadcaster = Broadcaster::new();
        let mut sub1 = broadcaster.subscribe("poll:cabinet").await;
        let mut sub2 = broadcaster.subscribe("poll:cabinet").await;

        let delivered = broadcaster.publish("poll:cabinet", "hello").await;

        assert_eq!(delivered, 2);
        assert_eq!(sub1.rx.recv().await.unwrap(), "hello");
        assert_eq!(sub2.rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_channels_are_isolated() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe("poll:other").await;

        let delivered = broadcaster.publish("poll:cabinet", "hello").await;

        assert_eq!(delivered, 0);
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_drops_empty_channel() {
        let broadcaster = Broadcaster::new();
        let sub = broadcaster.subscribe("poll:cabinet").await;
        assert_eq!(broadcaster.channel_count().await, 1);

        broadcaster.unsubscribe("poll:cabinet", sub.id).await;

        assert_eq!(broadcaster.channel_count().await, 0);
    }

    #[tokio::test]
    async fn test_publish_prunes_dropped_subscribers() {
        let broadcaster = Broadcaster::new();
        let sub1 = broadcaster.subscribe("poll:cabinet").await;
        let mut sub2 = broadcaster.subscribe("poll:cabinet").await;

        drop(sub1);

        let delivered = broadcaster.publish("poll:cabinet", "hello").await;
        assert_eq!(delivered, 1);
        assert_eq!(sub2.rx.recv().await.unwrap(), "hello");

        drop(sub2);
        assert_eq!(broadcaster.publish("poll:cabinet", "again").await, 0);
        assert_eq!(broadcaster.channel_count().await, 0);
    }
}
