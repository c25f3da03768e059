//! Group-addressed publish over the push-delivery transport.
//!
//! The transport itself (connection handling, group membership) lives
//! outside this crate; the core only depends on the four capabilities in
//! `PushTransport`. Delivery is fire-and-forget and best-effort: a
//! disconnected subscriber simply misses what was published meanwhile.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::types::{Game, PlayEvent};

/// Event names as seen by subscribers.
pub const SCORE_UPDATED: &str = "ScoreUpdated";
pub const PLAY_EVENT: &str = "PlayEvent";

/// Per-connection identifier handed out by the transport.
pub type ConnId = usize;

/// Topic for a single game's updates.
pub fn game_topic(id: Uuid) -> String {
    format!("game-{id}")
}

/// Capabilities the core needs from the push-delivery transport.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn join(&self, conn: ConnId, topic: &str);
    async fn leave(&self, conn: ConnId, topic: &str);
    async fn publish_to_topic(&self, topic: &str, event: &str, payload: Value) -> Result<()>;
    async fn publish_to_all(&self, event: &str, payload: Value) -> Result<()>;
}

/// Publishes domain events to their topics. Publish failures are logged,
/// never surfaced: broadcasting must not fail a store write that already
/// landed.
#[derive(Clone)]
pub struct Broadcaster {
    transport: Arc<dyn PushTransport>,
}

impl Broadcaster {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self { transport }
    }

    /// `ScoreUpdated` to the game's topic with the full game as payload.
    pub async fn score_updated(&self, game: &Game) {
        let topic = game_topic(game.id);
        self.publish(&topic, SCORE_UPDATED, game).await;
    }

    /// `PlayEvent` to the owning game's topic with the full play as payload.
    pub async fn play_event(&self, play: &PlayEvent) {
        let topic = game_topic(play.game_id);
        self.publish(&topic, PLAY_EVENT, play).await;
    }

    /// Administrative broadcast to every connected subscriber.
    pub async fn announce_all(&self, game: &Game) {
        match serde_json::to_value(game) {
            Ok(payload) => {
                if let Err(e) = self.transport.publish_to_all(SCORE_UPDATED, payload).await {
                    warn!("broadcast to all clients failed: {e:#}");
                }
            }
            Err(e) => warn!("failed to serialize broadcast payload: {e}"),
        }
    }

    async fn publish<T: Serialize>(&self, topic: &str, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => {
                if let Err(e) = self.transport.publish_to_topic(topic, event, value).await {
                    warn!("publish of {event} to {topic} failed: {e:#}");
                }
            }
            Err(e) => warn!("failed to serialize {event} payload for {topic}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_name_embeds_game_id() {
        let id = Uuid::new_v4();
        assert_eq!(game_topic(id), format!("game-{id}"));
    }
}
