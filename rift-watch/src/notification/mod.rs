//! Notification delivery.
//!
//! The monitor hands finished events to a [`Notifier`] together with the
//! scope (chat server) they belong to. Rendering is entirely the notifier's
//! concern.

mod broadcast;
mod log;

pub use broadcast::{BroadcastNotifier, Notification};
pub use log::LogNotifier;

use async_trait::async_trait;
use std::sync::Arc;

use crate::Result;
use crate::monitor::DomainEvent;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the notifier type name.
    fn notifier_type(&self) -> &'static str;

    /// Deliver events for one scope.
    async fn deliver(&self, events: &[DomainEvent], scope: u64) -> Result<()>;
}

/// Delivers to several notifiers in order. Every notifier is attempted; the
/// first error is returned.
pub struct FanoutNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    fn notifier_type(&self) -> &'static str {
        "fanout"
    }

    async fn deliver(&self, events: &[DomainEvent], scope: u64) -> Result<()> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.deliver(events, scope).await {
                tracing::warn!(
                    notifier = notifier.notifier_type(),
                    scope,
                    error = %e,
                    "notifier failed"
                );
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
