//! Per-player diff anchor.

use std::collections::BTreeMap;

use riot_api::{PlayerSummary, Queue, RankValue, Snapshot};
use serde::{Deserialize, Serialize};

/// What the monitor remembers about a player between polls.
///
/// Replaced wholesale at the end of every successful check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Newest match seen. `None` only when the player had no history at all.
    pub last_seen_match_id: Option<String>,
    /// Start of the newest match, milliseconds since the epoch. 0 if unknown.
    pub last_seen_match_timestamp: i64,
    pub loss_streak: u32,
    pub ranks: BTreeMap<Queue, RankValue>,
    pub player: PlayerSummary,
}

impl MemoryRecord {
    pub fn from_snapshot(
        snapshot: &Snapshot,
        last_seen_match_id: Option<String>,
        last_seen_match_timestamp: i64,
        loss_streak: u32,
    ) -> Self {
        Self {
            last_seen_match_id,
            last_seen_match_timestamp,
            loss_streak,
            ranks: snapshot.ranks.clone(),
            player: snapshot.summary(),
        }
    }

    pub fn rank(&self, queue: Queue) -> RankValue {
        self.ranks.get(&queue).cloned().unwrap_or_default()
    }
}
