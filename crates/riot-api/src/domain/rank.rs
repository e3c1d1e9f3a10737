//! Ranked ladder value objects.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Ranked queue a rank is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Queue {
    #[serde(rename = "Solo/Duo")]
    SoloDuo,
    Flex,
}

impl Queue {
    pub const ALL: [Queue; 2] = [Queue::SoloDuo, Queue::Flex];

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoloDuo => "Solo/Duo",
            Self::Flex => "Flex",
        }
    }

    /// Identifier used by the league endpoints.
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::SoloDuo => "RANKED_SOLO_5x5",
            Self::Flex => "RANKED_FLEX_SR",
        }
    }

    pub fn from_api_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.api_name() == s)
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ladder division, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Division {
    #[default]
    Unranked,
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unranked => "UNRANKED",
            Self::Iron => "IRON",
            Self::Bronze => "BRONZE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
            Self::Emerald => "EMERALD",
            Self::Diamond => "DIAMOND",
            Self::Master => "MASTER",
            Self::Grandmaster => "GRANDMASTER",
            Self::Challenger => "CHALLENGER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "UNRANKED" => Some(Self::Unranked),
            "IRON" => Some(Self::Iron),
            "BRONZE" => Some(Self::Bronze),
            "SILVER" => Some(Self::Silver),
            "GOLD" => Some(Self::Gold),
            "PLATINUM" => Some(Self::Platinum),
            "EMERALD" => Some(Self::Emerald),
            "DIAMOND" => Some(Self::Diamond),
            "MASTER" => Some(Self::Master),
            "GRANDMASTER" => Some(Self::Grandmaster),
            "CHALLENGER" => Some(Self::Challenger),
            _ => None,
        }
    }

    /// Apex divisions have no tiers.
    pub fn has_tiers(&self) -> bool {
        !matches!(
            self,
            Self::Unranked | Self::Master | Self::Grandmaster | Self::Challenger
        )
    }

    fn index(&self) -> i64 {
        *self as i64
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier within a division. `I` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    I,
    II,
    III,
    IV,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "I" => Some(Self::I),
            "II" => Some(Self::II),
            "III" => Some(Self::III),
            "IV" => Some(Self::IV),
            _ => None,
        }
    }

    /// Height of the tier: IV is 1, I is 4.
    fn height(&self) -> i64 {
        match self {
            Self::IV => 1,
            Self::III => 2,
            Self::II => 3,
            Self::I => 4,
        }
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.height().cmp(&other.height())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player's standing in one queue.
///
/// Ordered by division, then tier, then league points. Wins and losses do
/// not take part in the ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankValue {
    pub division: Division,
    pub tier: Option<Tier>,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
}

impl RankValue {
    pub fn unranked() -> Self {
        Self {
            division: Division::Unranked,
            tier: None,
            points: 0,
            wins: 0,
            losses: 0,
        }
    }

    /// Build from league entry fields. The tier is dropped for apex divisions.
    pub fn new(division: Division, tier: Option<Tier>, points: u32, wins: u32, losses: u32) -> Self {
        Self {
            division,
            tier: if division.has_tiers() { tier } else { None },
            points,
            wins,
            losses,
        }
    }

    /// Same division and tier, regardless of points.
    pub fn is_same_as(&self, other: &Self) -> bool {
        self.division == other.division && self.tier == other.tier
    }

    pub fn is_ranked(&self) -> bool {
        self.division != Division::Unranked
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win percentage, `None` without games.
    pub fn win_rate(&self) -> Option<f64> {
        match self.games() {
            0 => None,
            games => Some(self.wins as f64 / games as f64 * 100.0),
        }
    }

    /// e.g. `GOLD II` or `MASTER`.
    pub fn full_name(&self) -> String {
        match self.tier {
            Some(tier) => format!("{} {}", self.division, tier),
            None => self.division.to_string(),
        }
    }

    /// Flat numeric key, higher is better.
    pub fn score(&self) -> i64 {
        self.division.index() * 1000
            + self.tier.map_or(0, |t| t.height()) * 150
            + self.points as i64
    }

    /// Short summary such as `45 LP, 120 games, 52.50% WR`.
    pub fn info(&self) -> String {
        let mut s = String::new();
        if self.is_ranked() {
            s.push_str(&format!("{} LP, ", self.points));
        }
        s.push_str(&format!("{} games", self.games()));
        if let Some(rate) = self.win_rate() {
            s.push_str(&format!(", {rate:.2}% WR"));
        }
        s
    }
}

impl Default for RankValue {
    fn default() -> Self {
        Self::unranked()
    }
}

impl PartialOrd for RankValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.division
            .cmp(&other.division)
            .then_with(|| self.tier.cmp(&other.tier))
            .then_with(|| self.points.cmp(&other.points))
    }
}
