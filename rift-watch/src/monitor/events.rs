//! Events emitted by the player monitor.
//!
//! Events carry data only. Turning them into chat messages or images is the
//! notifier's business.

use chrono::{DateTime, Utc};
use riot_api::{PlayerSummary, Queue, QueueKind, RankValue};
use serde::{Deserialize, Serialize};

/// The match an event is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAnchor {
    pub match_id: String,
    /// Milliseconds since the epoch.
    pub start_timestamp: i64,
}

impl MatchAnchor {
    pub fn new(match_id: impl Into<String>, start_timestamp: i64) -> Self {
        Self {
            match_id: match_id.into(),
            start_timestamp,
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A finished match with a kda below the threshold.
    LowPerformance {
        player: PlayerSummary,
        anchor: MatchAnchor,
        kda: f64,
        /// `k/d/a`.
        score: String,
        champion: String,
        queue: QueueKind,
    },
    /// The player lost `streak` non-remake matches in a row.
    LossStreak {
        player: PlayerSummary,
        anchor: MatchAnchor,
        streak: u32,
    },
    /// Division or tier changed in a ranked queue.
    RankChanged {
        player: PlayerSummary,
        anchor: MatchAnchor,
        queue: Queue,
        previous: RankValue,
        current: RankValue,
    },
    /// The games played in a ranked queue crossed a milestone.
    MilestoneReached {
        player: PlayerSummary,
        anchor: MatchAnchor,
        queue: Queue,
        games: u32,
        milestone: u32,
    },
    /// `displacer` took `position` (1-based) from `displaced`.
    LeaderboardOvertake {
        displacer: PlayerSummary,
        displaced: PlayerSummary,
        anchor: MatchAnchor,
        queue: Queue,
        position: usize,
    },
}

impl DomainEvent {
    /// The player the event is about.
    pub fn player(&self) -> &PlayerSummary {
        match self {
            Self::LowPerformance { player, .. }
            | Self::LossStreak { player, .. }
            | Self::RankChanged { player, .. }
            | Self::MilestoneReached { player, .. } => player,
            Self::LeaderboardOvertake { displacer, .. } => displacer,
        }
    }

    pub fn anchor(&self) -> &MatchAnchor {
        match self {
            Self::LowPerformance { anchor, .. }
            | Self::LossStreak { anchor, .. }
            | Self::RankChanged { anchor, .. }
            | Self::MilestoneReached { anchor, .. }
            | Self::LeaderboardOvertake { anchor, .. } => anchor,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::LowPerformance { .. } => "low_performance",
            Self::LossStreak { .. } => "loss_streak",
            Self::RankChanged { .. } => "rank_changed",
            Self::MilestoneReached { .. } => "milestone_reached",
            Self::LeaderboardOvertake { .. } => "leaderboard_overtake",
        }
    }

    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            Self::LowPerformance {
                player,
                score,
                champion,
                kda,
                ..
            } => format!(
                "{} went {} on {} ({} KDA)",
                player.riot_id(),
                score,
                champion,
                kda
            ),
            Self::LossStreak { player, streak, .. } => {
                format!("{} has lost {} games in a row", player.riot_id(), streak)
            }
            Self::RankChanged {
                player,
                queue,
                previous,
                current,
                ..
            } => {
                let verb = if current > previous { "promoted" } else { "demoted" };
                format!(
                    "{} {} to {} in {} (was {})",
                    player.riot_id(),
                    verb,
                    current.full_name(),
                    queue,
                    previous.full_name()
                )
            }
            Self::MilestoneReached {
                player,
                queue,
                milestone,
                ..
            } => format!(
                "{} has played {} {} games",
                player.riot_id(),
                milestone,
                queue
            ),
            Self::LeaderboardOvertake {
                displacer,
                displaced,
                queue,
                position,
                ..
            } => format!(
                "{} overtook {} for #{} in {}",
                displacer.riot_id(),
                displaced.riot_id(),
                position,
                queue
            ),
        }
    }
}
