//! Periodic polling loop.
//!
//! Every cycle checks each distinct tracked player once, then routes the
//! resulting events to every scope that tracks the player, followed by the
//! scope's leaderboard overtakes.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Result;
use crate::monitor::{DomainEvent, LeaderboardTracker, PlayerMonitor};
use crate::notification::Notifier;
use crate::store::{Store, StoreState};

/// Outcome of one polling cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub players: usize,
    pub scopes: usize,
    pub events: usize,
    pub failed_deliveries: usize,
}

pub struct Watcher {
    monitor: Arc<PlayerMonitor>,
    leaderboard: LeaderboardTracker,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn Store>,
    state: RwLock<StoreState>,
    poll_interval: Duration,
}

impl Watcher {
    pub fn new(
        monitor: Arc<PlayerMonitor>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn Store>,
        state: StoreState,
        poll_interval: Duration,
    ) -> Self {
        Self {
            monitor,
            leaderboard: LeaderboardTracker::new(),
            notifier,
            store,
            state: RwLock::new(state),
            poll_interval,
        }
    }

    pub fn monitor(&self) -> &Arc<PlayerMonitor> {
        &self.monitor
    }

    pub fn leaderboard(&self) -> &LeaderboardTracker {
        &self.leaderboard
    }

    pub fn state(&self) -> StoreState {
        self.state.read().clone()
    }

    /// Apply a change to the tracking state and persist it.
    pub async fn update_state<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut StoreState),
    {
        let snapshot = {
            let mut state = self.state.write();
            f(&mut state);
            state.clone()
        };
        self.store.save(&snapshot).await
    }

    /// Build memory and leaderboard baselines without delivering anything.
    pub async fn warm_up(&self) {
        let state = self.state();
        let ids = state.all_tracked_ids();
        if ids.is_empty() {
            return;
        }

        let discarded = self.monitor.check(&ids).await;
        for (scope, _) in state.active_scopes() {
            self.leaderboard
                .check(scope, &state.tracked_ids(scope), &self.monitor);
        }
        info!(
            players = ids.len(),
            discarded = discarded.len(),
            "memory warmed up"
        );
    }

    /// Run one polling cycle.
    pub async fn run_once(&self) -> CycleReport {
        let state = self.state();
        let scopes = state.active_scopes();

        let mut ids: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for (scope, _) in &scopes {
            for id in state.tracked_ids(*scope) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        let mut report = CycleReport {
            players: ids.len(),
            scopes: scopes.len(),
            ..Default::default()
        };
        if ids.is_empty() {
            debug!("nothing to poll");
            return report;
        }

        let player_events = self.monitor.check(&ids).await;

        for (scope, target) in scopes {
            let scope_ids = state.tracked_ids(scope);
            let mut events: Vec<DomainEvent> = player_events
                .iter()
                .filter(|e| scope_ids.contains(&e.player().puuid))
                .cloned()
                .collect();
            events.extend(self.leaderboard.check(scope, &scope_ids, &self.monitor));

            if events.is_empty() {
                continue;
            }
            report.events += events.len();

            if let Err(e) = self.notifier.deliver(&events, scope).await {
                report.failed_deliveries += 1;
                warn!(
                    scope,
                    target,
                    notifier = self.notifier.notifier_type(),
                    error = %e,
                    "failed to deliver events"
                );
            }
        }

        if self.refresh_profiles(&ids) {
            let snapshot = self.state();
            if let Err(e) = self.store.save(&snapshot).await {
                warn!(error = %e, "failed to persist refreshed profiles");
            }
        }

        report
    }

    /// Copy display data from monitor memory into the tracked lists.
    fn refresh_profiles(&self, ids: &[String]) -> bool {
        let mut state = self.state.write();
        let mut changed = false;
        for id in ids {
            if let Some(record) = self.monitor.memory(id) {
                changed |= state.refresh_profile(&record.player);
            }
        }
        changed
    }

    /// Warm up, then poll every `poll_interval` until cancelled.
    pub async fn run(&self, token: CancellationToken) {
        info!(interval_secs = self.poll_interval.as_secs(), "starting watcher");

        tokio::select! {
            _ = token.cancelled() => {
                info!("watcher cancelled during warm up");
                return;
            }
            _ = self.warm_up() => {}
        }

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("watcher received cancellation signal");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.run_once().await;
                    debug!(
                        players = report.players,
                        scopes = report.scopes,
                        events = report.events,
                        failed = report.failed_deliveries,
                        "poll cycle finished"
                    );
                }
            }
        }
    }
}
