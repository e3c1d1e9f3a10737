use async_trait::async_trait;
use tracing::info;

use super::Notifier;
use crate::Result;
use crate::monitor::DomainEvent;

/// Writes one structured log line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn notifier_type(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, events: &[DomainEvent], scope: u64) -> Result<()> {
        for event in events {
            info!(
                scope,
                kind = event.kind(),
                puuid = %event.player().puuid,
                match_id = %event.anchor().match_id,
                "{}",
                event.description()
            );
        }
        Ok(())
    }
}
