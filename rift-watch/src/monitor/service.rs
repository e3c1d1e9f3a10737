//! Player monitor service.
//!
//! The PlayerMonitor keeps one [`MemoryRecord`] per tracked player and turns
//! each poll into the events that happened since the previous one.
//!
//! Per poll and player:
//! 1. fetch the recent match ids and a fresh snapshot; on failure stop
//!    without touching memory,
//! 2. without a usable anchor in the id window, resync: rebuild the memory
//!    from history and announce nothing,
//! 3. otherwise walk the matches newer than the anchor, oldest first, for
//!    performance and streak events,
//! 4. compare ranks and games played against memory,
//! 5. replace the memory record.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use riot_api::{Kda, MatchRecord, PlayerSource, PlayerSummary, Queue, RankValue, Snapshot};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{Error, Result};

use super::events::{DomainEvent, MatchAnchor};
use super::memory::MemoryRecord;
use super::milestone::crossed_milestone;

/// Configuration for the player monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Match ids requested per poll.
    pub history_count: usize,
    /// Non-perfect kda strictly below this is reported.
    pub low_kda_threshold: f64,
    /// Loss streaks are reported from this length on.
    pub loss_streak_threshold: u32,
    pub announce_milestones: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_count: 20,
            low_kda_threshold: 1.0,
            loss_streak_threshold: 3,
            announce_milestones: true,
        }
    }
}

/// A ranked player as remembered by the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    pub puuid: String,
    pub player: PlayerSummary,
    pub rank: RankValue,
    pub last_seen: Option<MatchAnchor>,
}

pub struct PlayerMonitor {
    source: Arc<dyn PlayerSource>,
    config: MonitorConfig,
    memory: DashMap<String, MemoryRecord>,
    /// Serialises checks of the same player.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PlayerMonitor {
    pub fn new(source: Arc<dyn PlayerSource>) -> Self {
        Self::with_config(source, MonitorConfig::default())
    }

    pub fn with_config(source: Arc<dyn PlayerSource>, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            memory: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn memory(&self, puuid: &str) -> Option<MemoryRecord> {
        self.memory.get(puuid).map(|r| r.clone())
    }

    /// Drop a player's memory; the next check resyncs.
    ///
    /// Waits for a check of the same player in progress. The lock entry
    /// itself is kept so later checks still serialise on it.
    pub async fn forget(&self, puuid: &str) {
        let lock = self.player_lock(puuid);
        let _guard = lock.lock().await;
        self.memory.remove(puuid);
    }

    pub fn export_memory(&self) -> HashMap<String, MemoryRecord> {
        self.memory
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Merge previously exported records, replacing existing ones.
    ///
    /// Each record is written under its player's lock.
    pub async fn import_memory(&self, records: HashMap<String, MemoryRecord>) {
        for (puuid, record) in records {
            let lock = self.player_lock(&puuid);
            let _guard = lock.lock().await;
            self.memory.insert(puuid, record);
        }
    }

    fn player_lock(&self, puuid: &str) -> Arc<Mutex<()>> {
        self.locks.entry(puuid.to_string()).or_default().clone()
    }

    /// Check a batch of players concurrently and collect their events.
    ///
    /// A failing player contributes no events and does not affect the others.
    /// Repeated ids are checked once.
    pub async fn check(&self, puuids: &[String]) -> Vec<DomainEvent> {
        let mut seen = HashSet::new();
        let puuids: Vec<&String> = puuids.iter().filter(|p| seen.insert(p.as_str())).collect();
        let results = join_all(puuids.iter().map(|puuid| self.check_player(puuid))).await;

        let mut events = Vec::new();
        let mut failed = 0usize;
        for (puuid, result) in puuids.iter().zip(results) {
            match result {
                Ok(player_events) => events.extend(player_events),
                Err(e) => {
                    failed += 1;
                    warn!(puuid = %puuid, error = %e, kind = e.api_kind(), "player check failed");
                }
            }
        }

        info!(
            players = puuids.len(),
            failed,
            events = events.len(),
            "completed event checks"
        );
        events
    }

    /// Check one player.
    ///
    /// Returns an error only if the initial fetches fail, in which case memory
    /// is left untouched.
    pub async fn check_player(&self, puuid: &str) -> Result<Vec<DomainEvent>> {
        let lock = self.player_lock(puuid);
        let _guard = lock.lock().await;

        let (ids, snapshot) = tokio::try_join!(
            self.source.match_ids(puuid, self.config.history_count),
            self.source.snapshot(puuid),
        )?;

        let previous = self.memory(puuid);
        let Some(previous) = previous else {
            info!(player = %snapshot.summary().riot_id(), "no memory, resyncing");
            let record = self.resync(puuid, &snapshot, &ids).await;
            self.memory.insert(puuid.to_string(), record);
            return Ok(Vec::new());
        };

        let anchor_index = match previous.last_seen_match_id.as_deref() {
            Some(anchor) => match ids.iter().position(|id| id == anchor) {
                Some(index) => index,
                None => {
                    info!(
                        player = %snapshot.summary().riot_id(),
                        anchor,
                        "anchor left the match window, resyncing"
                    );
                    let record = self.resync(puuid, &snapshot, &ids).await;
                    self.memory.insert(puuid.to_string(), record);
                    return Ok(Vec::new());
                }
            },
            None if !ids.is_empty() => {
                info!(player = %snapshot.summary().riot_id(), "first matches found, resyncing");
                let record = self.resync(puuid, &snapshot, &ids).await;
                self.memory.insert(puuid.to_string(), record);
                return Ok(Vec::new());
            }
            None => 0,
        };

        let new_ids = &ids[..anchor_index];
        let records = self.fetch_new_matches(new_ids).await;
        if !records.is_empty() {
            debug!(
                player = %snapshot.summary().riot_id(),
                count = records.len(),
                "scanning new matches"
            );
        }

        let player = snapshot.summary();
        let (mut events, loss_streak) =
            self.scan_matches(puuid, &player, &records, previous.loss_streak);

        if let Some(latest) = records.last() {
            let anchor = MatchAnchor::new(&latest.id, latest.start_timestamp);
            events.extend(self.compare_ranks(&previous, &snapshot, &player, &anchor));
        }

        let last_timestamp = records
            .last()
            .map_or(previous.last_seen_match_timestamp, |r| r.start_timestamp);
        let record = MemoryRecord::from_snapshot(
            &snapshot,
            ids.first().cloned(),
            last_timestamp,
            loss_streak,
        );
        self.memory.insert(puuid.to_string(), record);

        Ok(events)
    }

    /// Fetch matches concurrently, dropping failures. Returned oldest first.
    async fn fetch_new_matches(&self, newest_first: &[String]) -> Vec<MatchRecord> {
        let fetched = join_all(newest_first.iter().map(|id| self.source.match_record(id))).await;

        let mut records: Vec<MatchRecord> = fetched
            .into_iter()
            .zip(newest_first)
            .filter_map(|(result, id)| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(match_id = %id, error = %e, "could not fetch match, skipping");
                    None
                }
            })
            .collect();
        records.reverse();
        records
    }

    /// Walk matches oldest first. Returns the events and the final loss streak.
    fn scan_matches(
        &self,
        puuid: &str,
        player: &PlayerSummary,
        oldest_first: &[MatchRecord],
        mut loss_streak: u32,
    ) -> (Vec<DomainEvent>, u32) {
        let mut events = Vec::new();

        for record in oldest_first {
            let Some(participant) = record.participant(puuid) else {
                warn!(
                    player = %player.riot_id(),
                    match_id = %record.id,
                    "player missing from match participants"
                );
                continue;
            };
            let anchor = MatchAnchor::new(&record.id, record.start_timestamp);

            let kda = participant.kda();
            if kda.is_below(self.config.low_kda_threshold)
                && let Kda::Ratio(kda) = kda
            {
                events.push(DomainEvent::LowPerformance {
                    player: player.clone(),
                    anchor: anchor.clone(),
                    kda,
                    score: participant.score(),
                    champion: participant.champion_name.clone(),
                    queue: record.queue,
                });
            }

            match record.won_by(puuid) {
                None => continue,
                Some(true) => loss_streak = 0,
                Some(false) => {
                    loss_streak += 1;
                    if loss_streak >= self.config.loss_streak_threshold {
                        events.push(DomainEvent::LossStreak {
                            player: player.clone(),
                            anchor,
                            streak: loss_streak,
                        });
                    }
                }
            }
        }

        (events, loss_streak)
    }

    fn compare_ranks(
        &self,
        previous: &MemoryRecord,
        snapshot: &Snapshot,
        player: &PlayerSummary,
        anchor: &MatchAnchor,
    ) -> Vec<DomainEvent> {
        let mut events = Vec::new();

        for queue in Queue::ALL {
            let before = previous.rank(queue);
            let now = snapshot.rank(queue);

            if !before.is_same_as(&now) {
                events.push(DomainEvent::RankChanged {
                    player: player.clone(),
                    anchor: anchor.clone(),
                    queue,
                    previous: before.clone(),
                    current: now.clone(),
                });
            }

            if self.config.announce_milestones
                && let Some(milestone) = crossed_milestone(before.games(), now.games())
            {
                events.push(DomainEvent::MilestoneReached {
                    player: player.clone(),
                    anchor: anchor.clone(),
                    queue,
                    games: now.games(),
                    milestone,
                });
            }
        }

        events
    }

    /// Rebuild a memory record from history, newest first.
    ///
    /// The loss streak counts losses from the newest match backwards, skipping
    /// remakes and matches that cannot be fetched, until the first win. A
    /// match without the player counts as a win.
    async fn resync(&self, puuid: &str, snapshot: &Snapshot, newest_first: &[String]) -> MemoryRecord {
        let mut loss_streak = 0;
        let mut last_timestamp = 0;

        for (i, id) in newest_first.iter().enumerate() {
            let record = match self.source.match_record(id).await {
                Ok(record) => record,
                Err(e) => {
                    debug!(match_id = %id, error = %e, "skipping unreadable match during resync");
                    continue;
                }
            };
            if i == 0 {
                last_timestamp = record.start_timestamp;
            }
            if record.is_remake() {
                continue;
            }
            match record.won_by(puuid) {
                Some(false) => loss_streak += 1,
                _ => break,
            }
        }

        MemoryRecord::from_snapshot(
            snapshot,
            newest_first.first().cloned(),
            last_timestamp,
            loss_streak,
        )
    }

    /// Resync as though the newest `offset` matches had not been seen yet,
    /// so that the next check announces them.
    pub async fn rewind(&self, puuid: &str, offset: usize) -> Result<()> {
        let lock = self.player_lock(puuid);
        let _guard = lock.lock().await;

        let (ids, snapshot) = tokio::try_join!(
            self.source.match_ids(puuid, self.config.history_count),
            self.source.snapshot(puuid),
        )?;

        if offset >= ids.len() {
            return Err(Error::validation(format!(
                "cannot rewind {offset} matches, only {} known",
                ids.len()
            )));
        }

        let record = self.resync(puuid, &snapshot, &ids[offset..]).await;
        info!(
            player = %snapshot.summary().riot_id(),
            offset,
            anchor = ?record.last_seen_match_id,
            "memory rewound"
        );
        self.memory.insert(puuid.to_string(), record);
        Ok(())
    }

    /// Ranked players among `puuids`, best first. Ties keep the input order.
    /// Players without memory or unranked in `queue` are left out.
    pub fn ordered_rankings(&self, queue: Queue, puuids: &[String]) -> Vec<RankedPlayer> {
        let mut ranked: Vec<RankedPlayer> = puuids
            .iter()
            .filter_map(|puuid| {
                let record = self.memory.get(puuid)?;
                let rank = record.rank(queue);
                if !rank.is_ranked() {
                    return None;
                }
                Some(RankedPlayer {
                    puuid: puuid.clone(),
                    player: record.player.clone(),
                    rank,
                    last_seen: record
                        .last_seen_match_id
                        .as_ref()
                        .map(|id| MatchAnchor::new(id, record.last_seen_match_timestamp)),
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.rank.cmp(&a.rank));
        ranked
    }
}
