//! Leaderboard overtakes per scope and queue.

use std::collections::HashSet;

use dashmap::DashMap;
use riot_api::Queue;
use tracing::debug;

use super::events::{DomainEvent, MatchAnchor};
use super::service::{PlayerMonitor, RankedPlayer};
use super::swap::detect_swaps;

/// Remembers the last ranked order of every (scope, queue) and reports
/// players that moved past others.
#[derive(Default)]
pub struct LeaderboardTracker {
    orders: DashMap<(u64, Queue), Vec<String>>,
}

impl LeaderboardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored order, best first.
    pub fn order(&self, scope: u64, queue: Queue) -> Option<Vec<String>> {
        self.orders.get(&(scope, queue)).map(|o| o.clone())
    }

    pub fn forget_scope(&self, scope: u64) {
        self.orders.retain(|(s, _), _| *s != scope);
    }

    /// Compare the current ranking of `puuids` with the stored one for every
    /// queue. The first call for a (scope, queue) only records the order.
    pub fn check(&self, scope: u64, puuids: &[String], monitor: &PlayerMonitor) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        for queue in Queue::ALL {
            let ranked = monitor.ordered_rankings(queue, puuids);
            events.extend(self.check_queue(scope, queue, &ranked));
        }
        events
    }

    fn check_queue(&self, scope: u64, queue: Queue, ranked: &[RankedPlayer]) -> Vec<DomainEvent> {
        let new_order: Vec<String> = ranked.iter().map(|r| r.puuid.clone()).collect();

        let Some(old_order) = self.orders.insert((scope, queue), new_order.clone()) else {
            debug!(scope, %queue, players = new_order.len(), "recorded initial leaderboard");
            return Vec::new();
        };

        let old_set: HashSet<&String> = old_order.iter().collect();
        let new_set: HashSet<&String> = new_order.iter().collect();
        let old_common: Vec<&String> = old_order.iter().filter(|p| new_set.contains(p)).collect();
        let new_common: Vec<&String> = new_order.iter().filter(|p| old_set.contains(p)).collect();

        detect_swaps(&old_common, &new_common)
            .into_iter()
            .filter_map(|(index, displaced, displacer)| {
                let displaced = ranked.iter().find(|r| &r.puuid == displaced)?;
                let displacer = ranked.iter().find(|r| &r.puuid == displacer)?;
                let anchor = later_anchor(displaced, displacer)?;
                Some(DomainEvent::LeaderboardOvertake {
                    displacer: displacer.player.clone(),
                    displaced: displaced.player.clone(),
                    anchor,
                    queue,
                    position: index + 1,
                })
            })
            .collect()
    }
}

/// The more recent of the two players' last seen matches.
fn later_anchor(a: &RankedPlayer, b: &RankedPlayer) -> Option<MatchAnchor> {
    match (&a.last_seen, &b.last_seen) {
        (Some(x), Some(y)) => Some(if y.start_timestamp >= x.start_timestamp {
            y.clone()
        } else {
            x.clone()
        }),
        (Some(x), None) => Some(x.clone()),
        (None, Some(y)) => Some(y.clone()),
        (None, None) => None,
    }
}
