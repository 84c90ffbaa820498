//! Redis Pub/Sub for cross-instance event distribution.
//!
//! Every instance publishes accepted ballots and frozen snapshots on one
//! shared channel and mirrors what it receives into a local broadcast, so
//! websocket subscribers see events regardless of which instance accepted
//! the ballot.

use std::sync::Arc;

use async_trait::async_trait;
use fred::clients::{Client, SubscriberClient};
use fred::error::{Error as RedisError, ErrorKind as RedisErrorKind};
use fred::interfaces::{ClientLike, EventInterface, PubsubInterface};
use fred::types::config::Config as RedisConfig;
use tierboard_common::{AppError, AppResult};
use tierboard_core::{EventPublisher, LeaderboardEvent};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Pub/Sub channel carrying all leaderboard events.
pub const EVENTS_CHANNEL: &str = "tierboard:events";

/// Redis Pub/Sub manager for event distribution.
#[derive(Clone)]
pub struct RedisPubSub {
    publisher: Client,
    subscriber: SubscriberClient,
    /// Local broadcast channel for events received from Redis.
    local_tx: broadcast::Sender<LeaderboardEvent>,
}

impl RedisPubSub {
    /// Create a new Redis Pub/Sub manager.
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let config = RedisConfig::from_url(redis_url)?;

        let publisher = Client::new(config.clone(), None, None, None);
        publisher.init().await?;

        let subscriber = SubscriberClient::new(config, None, None, None);
        subscriber.init().await?;

        let (local_tx, _) = broadcast::channel(1000);

        info!("Redis Pub/Sub initialized");

        Ok(Self {
            publisher,
            subscriber,
            local_tx,
        })
    }

    /// Subscribe to the event channel and start the receive loop.
    pub async fn start(&self) -> Result<(), RedisError> {
        self.subscriber.subscribe(EVENTS_CHANNEL).await?;

        info!(channel = EVENTS_CHANNEL, "Subscribed to leaderboard events");

        let local_tx = self.local_tx.clone();
        let mut message_stream = self.subscriber.message_rx();

        tokio::spawn(async move {
            while let Ok(message) = message_stream.recv().await {
                if let Some(payload) = message.value.as_string() {
                    match serde_json::from_str::<LeaderboardEvent>(&payload) {
                        Ok(event) => {
                            debug!(channel = %event.channel(), "received leaderboard event");
                            if local_tx.send(event).is_err() {
                                debug!("no local subscribers for leaderboard event");
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to parse Pub/Sub message");
                        }
                    }
                }
            }
            info!("Pub/Sub message stream ended");
        });

        Ok(())
    }

    /// Publish an event to every instance, this one included.
    pub async fn publish_event(&self, event: &LeaderboardEvent) -> Result<(), RedisError> {
        let payload = serde_json::to_string(event).map_err(|e| {
            RedisError::new(
                RedisErrorKind::InvalidArgument,
                format!("Serialization error: {e}"),
            )
        })?;
        let _: () = self.publisher.publish(EVENTS_CHANNEL, payload).await?;
        debug!(channel = %event.channel(), "published leaderboard event");
        Ok(())
    }

    /// Get a receiver for local broadcast events.
    #[must_use]
    pub fn subscribe_local(&self) -> broadcast::Receiver<LeaderboardEvent> {
        self.local_tx.subscribe()
    }

    /// Shutdown the Pub/Sub manager.
    pub async fn shutdown(&self) -> Result<(), RedisError> {
        self.subscriber.quit().await?;
        self.publisher.quit().await?;
        info!("Redis Pub/Sub shutdown");
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for RedisPubSub {
    async fn publish(&self, event: &LeaderboardEvent) -> AppResult<()> {
        self.publish_event(event)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }
}

/// Bridge between Redis Pub/Sub and the websocket broadcaster.
pub struct PubSubBridge {
    pubsub: Arc<RedisPubSub>,
}

impl PubSubBridge {
    /// Create a new bridge.
    #[must_use]
    pub const fn new(pubsub: Arc<RedisPubSub>) -> Self {
        Self { pubsub }
    }

    /// Start the bridge, forwarding received events to `on_event`.
    pub fn start<F>(&self, on_event: F)
    where
        F: Fn(LeaderboardEvent) + Send + Sync + 'static,
    {
        let mut rx = self.pubsub.subscribe_local();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => on_event(event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(lagged = n, "event bridge lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("event bridge channel closed");
                        break;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_events_channel_name() {
        assert_eq!(EVENTS_CHANNEL, "tierboard:events");
    }

    #[test]
    fn test_event_round_trips_over_the_wire() {
        let event = LeaderboardEvent::SnapshotFrozen {
            poll_slug: "cabinet".to_string(),
            day: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            entries: 12,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"snapshotFrozen\""));
        assert!(json.contains("\"pollSlug\":\"cabinet\""));

        let parsed: LeaderboardEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
