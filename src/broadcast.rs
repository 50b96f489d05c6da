//! Public feed. Delivery is best effort and happens after commit: a failed
//! send is logged and never reaches the player.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;

use crate::protocol::FeedEvent;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("encoding feed event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn send(&self, event: &FeedEvent) -> Result<(), BroadcastError>;
}

/// Publishes each event as JSON on a Redis pub/sub channel.
#[derive(Clone)]
pub struct RedisFeed {
    client: redis::Client,
    channel: String,
}

impl RedisFeed {
    pub fn new(client: redis::Client, channel: impl Into<String>) -> Self {
        RedisFeed {
            client,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl Broadcaster for RedisFeed {
    async fn send(&self, event: &FeedEvent) -> Result<(), BroadcastError> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.publish(&self.channel, payload).await?;
        Ok(())
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeed;

#[async_trait]
impl Broadcaster for NullFeed {
    async fn send(&self, _event: &FeedEvent) -> Result<(), BroadcastError> {
        Ok(())
    }
}

/// Keeps every event in memory; `failing()` rejects every send.
#[derive(Debug, Default)]
pub struct RecordingFeed {
    events: Mutex<Vec<FeedEvent>>,
    fail: bool,
}

impl RecordingFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        RecordingFeed {
            events: Mutex::default(),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<FeedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Broadcaster for RecordingFeed {
    async fn send(&self, event: &FeedEvent) -> Result<(), BroadcastError> {
        if self.fail {
            return Err(BroadcastError::Unavailable("recording feed set to fail".into()));
        }
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        Ok(())
    }
}

/// Send on a separate task and wait for it at most `limit`, swallowing
/// errors and panics. A send still pending after `limit` keeps running
/// detached.
pub async fn deliver(feed: Arc<dyn Broadcaster>, event: FeedEvent, limit: Duration) {
    let player = event.player_id;
    let task = tokio::spawn(async move { feed.send(&event).await });
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => log::warn!("feed delivery for {player} failed: {e}"),
        Ok(Err(e)) => log::error!("feed task for {player} crashed: {e}"),
        Err(_) => log::warn!("feed delivery for {player} still pending after {limit:?}"),
    }
}
