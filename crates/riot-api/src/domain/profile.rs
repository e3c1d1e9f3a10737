//! Player profile snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rank::{Queue, RankValue};

/// Number of champions kept in [`Snapshot::top_mastery`].
pub const TOP_MASTERY_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryEntry {
    pub champion_id: u32,
    pub level: u32,
    pub points: u64,
    /// Milliseconds since the epoch.
    pub last_play_time: i64,
}

/// Identity and display data of a player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub level: u32,
    pub icon: u32,
}

impl PlayerSummary {
    /// `name#tag`, or just the name when the tag is unknown.
    pub fn riot_id(&self) -> String {
        if self.tag_line.is_empty() {
            self.game_name.clone()
        } else {
            format!("{}#{}", self.game_name, self.tag_line)
        }
    }
}

/// Everything known about a player at one poll. Rebuilt on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub level: u32,
    pub icon: u32,
    /// Every ranked queue is present; unranked queues hold
    /// [`RankValue::unranked`].
    pub ranks: BTreeMap<Queue, RankValue>,
    pub top_mastery: Vec<MasteryEntry>,
    pub total_mastery_level: u64,
    pub total_mastery_points: u64,
}

impl Snapshot {
    pub fn rank(&self, queue: Queue) -> RankValue {
        self.ranks.get(&queue).cloned().unwrap_or_default()
    }

    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            puuid: self.puuid.clone(),
            game_name: self.game_name.clone(),
            tag_line: self.tag_line.clone(),
            level: self.level,
            icon: self.icon,
        }
    }

    /// Highest rank across all queues.
    pub fn best_rank(&self) -> RankValue {
        self.ranks.values().max().cloned().unwrap_or_default()
    }
}

/// A rank map with every queue set to unranked.
pub fn unranked_map() -> BTreeMap<Queue, RankValue> {
    Queue::ALL
        .into_iter()
        .map(|q| (q, RankValue::unranked()))
        .collect()
}
