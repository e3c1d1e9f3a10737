//! Persistence of tracked players and output targets.
//!
//! Only the tracking configuration is persisted. Monitor memory lives in
//! process and is rebuilt by resyncing after a restart.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use riot_api::PlayerSummary;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;

/// A player tracked in one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPlayer {
    pub puuid: String,
    pub name: String,
    pub tag: String,
    pub level: u32,
    /// Chat users who claimed this player and get mentioned on events.
    #[serde(default)]
    pub claimed_users: BTreeSet<u64>,
}

impl TrackedPlayer {
    pub fn from_summary(summary: &PlayerSummary) -> Self {
        Self {
            puuid: summary.puuid.clone(),
            name: summary.game_name.clone(),
            tag: summary.tag_line.to_uppercase(),
            level: summary.level,
            claimed_users: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    /// Tracked players per scope, in insertion order.
    #[serde(rename = "tracked_players")]
    pub tracked: HashMap<u64, Vec<TrackedPlayer>>,
    /// Output channel per scope.
    #[serde(rename = "output_channels")]
    pub output_targets: HashMap<u64, u64>,
}

impl StoreState {
    /// Add a player to a scope. Returns false if already tracked there.
    pub fn track(&mut self, scope: u64, player: TrackedPlayer) -> bool {
        let tracked = self.tracked.entry(scope).or_default();
        if tracked.iter().any(|p| p.puuid == player.puuid) {
            return false;
        }
        tracked.push(player);
        true
    }

    /// Remove the player at `index` within a scope.
    pub fn untrack(&mut self, scope: u64, index: usize) -> Option<TrackedPlayer> {
        let tracked = self.tracked.get_mut(&scope)?;
        (index < tracked.len()).then(|| tracked.remove(index))
    }

    pub fn tracked_ids(&self, scope: u64) -> Vec<String> {
        self.tracked
            .get(&scope)
            .map(|players| players.iter().map(|p| p.puuid.clone()).collect())
            .unwrap_or_default()
    }

    /// Every distinct tracked id across scopes.
    pub fn all_tracked_ids(&self) -> Vec<String> {
        let ids: BTreeSet<String> = self
            .tracked
            .values()
            .flatten()
            .map(|p| p.puuid.clone())
            .collect();
        ids.into_iter().collect()
    }

    /// Scopes that are tracking players and have an output target, ascending.
    pub fn active_scopes(&self) -> Vec<(u64, u64)> {
        let mut scopes: Vec<(u64, u64)> = self
            .output_targets
            .iter()
            .filter(|(scope, _)| self.tracked.get(scope).is_some_and(|t| !t.is_empty()))
            .map(|(scope, target)| (*scope, *target))
            .collect();
        scopes.sort_unstable();
        scopes
    }

    /// Toggle a chat user's claim on a tracked player. Returns the new claim state.
    pub fn toggle_claim(&mut self, scope: u64, index: usize, user_id: u64) -> Option<bool> {
        let player = self.tracked.get_mut(&scope)?.get_mut(index)?;
        if player.claimed_users.remove(&user_id) {
            Some(false)
        } else {
            player.claimed_users.insert(user_id);
            Some(true)
        }
    }

    /// Chat users to mention for events about `puuids` in a scope.
    pub fn mentions(&self, scope: u64, puuids: &[&str]) -> BTreeSet<u64> {
        self.tracked
            .get(&scope)
            .into_iter()
            .flatten()
            .filter(|p| puuids.contains(&p.puuid.as_str()))
            .flat_map(|p| p.claimed_users.iter().copied())
            .collect()
    }

    /// Refresh display data of tracked players. Returns true if anything changed.
    pub fn refresh_profile(&mut self, summary: &PlayerSummary) -> bool {
        let mut changed = false;
        for player in self.tracked.values_mut().flatten() {
            if player.puuid != summary.puuid {
                continue;
            }
            if player.level != summary.level
                || player.name != summary.game_name
                || !player.tag.eq_ignore_ascii_case(&summary.tag_line)
            {
                player.level = summary.level;
                player.name = summary.game_name.clone();
                player.tag = summary.tag_line.to_uppercase();
                changed = true;
            }
        }
        changed
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Load persisted state. Called once at startup.
    async fn load(&self) -> Result<StoreState>;

    async fn save(&self, state: &StoreState) -> Result<()>;
}

/// [`Store`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const FILENAME: &'static str = "memory.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `memory.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(Self::FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Store for JsonFileStore {
    /// A missing or undecodable file loads as empty state.
    async fn load(&self) -> Result<StoreState> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persistent memory yet");
                return Ok(StoreState::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<StoreState>(&bytes) {
            Ok(state) => {
                info!(
                    path = %self.path.display(),
                    scopes = state.tracked.len(),
                    "loaded persistent memory"
                );
                Ok(state)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to decode persistent memory");
                Ok(StoreState::default())
            }
        }
    }

    async fn save(&self, state: &StoreState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "updated persistent memory");
        Ok(())
    }
}
