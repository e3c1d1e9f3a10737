use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use super::Notifier;
use crate::Result;
use crate::monitor::DomainEvent;

/// An event addressed to a scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub scope: u64,
    pub event: DomainEvent,
    pub delivered_at: DateTime<Utc>,
}

/// Publishes every event on a broadcast channel, for in-process consumers
/// such as a chat bot front end.
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    /// Create a new notifier with default capacity (256).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    fn notifier_type(&self) -> &'static str {
        "broadcast"
    }

    async fn deliver(&self, events: &[DomainEvent], scope: u64) -> Result<()> {
        let delivered_at = Utc::now();
        for event in events {
            // No subscribers is not an error.
            if self
                .sender
                .send(Notification {
                    scope,
                    event: event.clone(),
                    delivered_at,
                })
                .is_err()
            {
                trace!(scope, "no notification subscribers");
            }
        }
        Ok(())
    }
}
