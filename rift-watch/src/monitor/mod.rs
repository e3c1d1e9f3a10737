//! Player monitor module.
//!
//! The monitor is responsible for:
//! - Remembering the last seen match, loss streak and ranks of each player
//! - Turning new matches into performance, streak, rank and milestone events
//! - Detecting leaderboard overtakes between tracked players

mod events;
mod leaderboard;
mod memory;
mod milestone;
mod service;
mod swap;

pub use events::{DomainEvent, MatchAnchor};
pub use leaderboard::LeaderboardTracker;
pub use memory::MemoryRecord;
pub use milestone::{crossed_milestone, is_milestone};
pub use service::{MonitorConfig, PlayerMonitor, RankedPlayer};
pub use swap::detect_swaps;
