//! In-process WebSocket hub implementing the push-delivery transport.
//!
//! Connections register an unbounded sender for outbound frames; topics
//! are plain member sets. Publishing serializes the event once and fans
//! it out; a send to a gone connection is dropped silently, which is the
//! whole delivery guarantee (best-effort, no replay).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use scores_core::broadcast::{ConnId, PushTransport};

#[derive(Clone, Default)]
pub struct WsHub {
    inner: Arc<HubInner>,
}

#[derive(Default)]
struct HubInner {
    next_conn_id: AtomicUsize,
    clients: RwLock<HashMap<ConnId, mpsc::UnboundedSender<String>>>,
    topics: RwLock<HashMap<String, HashSet<ConnId>>>,
}

impl WsHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection; the receiver yields frames to forward
    /// to the socket.
    pub fn register(&self) -> (ConnId, mpsc::UnboundedReceiver<String>) {
        let conn = self.inner.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.clients.write().insert(conn, tx);
        (conn, rx)
    }

    /// Drop a connection and its topic memberships.
    pub fn unregister(&self, conn: ConnId) {
        self.inner.clients.write().remove(&conn);
        let mut topics = self.inner.topics.write();
        topics.retain(|_, members| {
            members.remove(&conn);
            !members.is_empty()
        });
    }

    pub fn client_count(&self) -> usize {
        self.inner.clients.read().len()
    }

    fn frame(event: &str, payload: &Value) -> String {
        json!({ "event": event, "data": payload }).to_string()
    }

    fn send_to(&self, conn: ConnId, frame: &str) {
        if let Some(tx) = self.inner.clients.read().get(&conn) {
            // Receiver gone means the socket task is tearing down.
            let _ = tx.send(frame.to_string());
        }
    }
}

#[async_trait]
impl PushTransport for WsHub {
    async fn join(&self, conn: ConnId, topic: &str) {
        self.inner
            .topics
            .write()
            .entry(topic.to_string())
            .or_default()
            .insert(conn);
    }

    async fn leave(&self, conn: ConnId, topic: &str) {
        let mut topics = self.inner.topics.write();
        if let Some(members) = topics.get_mut(topic) {
            members.remove(&conn);
            if members.is_empty() {
                topics.remove(topic);
            }
        }
    }

    async fn publish_to_topic(&self, topic: &str, event: &str, payload: Value) -> Result<()> {
        let frame = Self::frame(event, &payload);
        let members: Vec<ConnId> = self
            .inner
            .topics
            .read()
            .get(topic)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default();
        for conn in members {
            self.send_to(conn, &frame);
        }
        Ok(())
    }

    async fn publish_to_all(&self, event: &str, payload: Value) -> Result<()> {
        let frame = Self::frame(event, &payload);
        let conns: Vec<ConnId> = self.inner.clients.read().keys().copied().collect();
        for conn in conns {
            self.send_to(conn, &frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn topic_publish_reaches_only_members() {
        let hub = WsHub::new();
        let (a, mut rx_a) = hub.register();
        let (_b, mut rx_b) = hub.register();

        hub.join(a, "game-1").await;
        hub.publish_to_topic("game-1", "ScoreUpdated", json!({"homeScore": 7}))
            .await
            .unwrap();

        let frame = rx_a.try_recv().unwrap();
        let parsed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["event"], "ScoreUpdated");
        assert_eq!(parsed["data"]["homeScore"], 7);

        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn leaving_a_topic_stops_delivery() {
        let hub = WsHub::new();
        let (a, mut rx_a) = hub.register();

        hub.join(a, "game-1").await;
        hub.leave(a, "game-1").await;
        hub.publish_to_topic("game-1", "ScoreUpdated", json!({}))
            .await
            .unwrap();

        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_to_all_reaches_every_connection() {
        let hub = WsHub::new();
        let (_a, mut rx_a) = hub.register();
        let (_b, mut rx_b) = hub.register();

        hub.publish_to_all("ScoreUpdated", json!({})).await.unwrap();

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unregister_removes_client_and_memberships() {
        let hub = WsHub::new();
        let (a, mut rx_a) = hub.register();
        hub.join(a, "game-1").await;

        hub.unregister(a);
        assert_eq!(hub.client_count(), 0);

        hub.publish_to_topic("game-1", "ScoreUpdated", json!({}))
            .await
            .unwrap();
        hub.publish_to_all("ScoreUpdated", json!({})).await.unwrap();
        assert!(rx_a.try_recv().is_err());
    }
}
