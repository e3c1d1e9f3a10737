//! Finished match records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Matches shorter than this are remakes, whatever the reported winner.
pub const REMAKE_THRESHOLD_SECS: u64 = 300;

/// Category tag of a match, derived from its queue id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueKind {
    Draft,
    #[serde(rename = "Solo/Duo")]
    SoloDuo,
    Blind,
    Flex,
    #[serde(rename = "ARAM")]
    Aram,
    Clash,
    Other,
}

impl QueueKind {
    pub fn from_queue_id(id: u32) -> Self {
        match id {
            400 => Self::Draft,
            420 => Self::SoloDuo,
            430 => Self::Blind,
            440 => Self::Flex,
            450 => Self::Aram,
            700 => Self::Clash,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::SoloDuo => "Solo/Duo",
            Self::Blind => "Blind",
            Self::Flex => "Flex",
            Self::Aram => "ARAM",
            Self::Clash => "Clash",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    /// Team id 100 is blue, everything else red.
    pub fn from_team_id(team_id: u32) -> Self {
        if team_id == 100 { Self::Blue } else { Self::Red }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    BlueWin,
    RedWin,
    /// Voided match; counts neither as a win nor a loss.
    Remake,
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::BlueWin => Some(Side::Blue),
            Self::RedWin => Some(Side::Red),
            Self::Remake => None,
        }
    }
}

/// Kill/death/assist ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Kda {
    /// No deaths.
    Perfect,
    Ratio(f64),
}

impl Kda {
    pub fn is_below(&self, threshold: f64) -> bool {
        match self {
            Self::Perfect => false,
            Self::Ratio(r) => *r < threshold,
        }
    }
}

impl fmt::Display for Kda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Perfect => f.write_str("Perfect"),
            Self::Ratio(r) => write!(f, "{r}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub puuid: String,
    pub riot_name: String,
    pub side: Side,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub champion_id: u32,
    pub champion_name: String,
    pub gold: u32,
    pub damage: u32,
    pub creep_score: u32,
    pub vision_score: u32,
    pub position: String,
    /// Double, triple, quadra and penta kills.
    pub multikills: [u32; 4],
}

impl ParticipantRecord {
    /// `(kills + assists) / deaths` rounded to two places.
    pub fn kda(&self) -> Kda {
        if self.deaths == 0 {
            return Kda::Perfect;
        }
        let ratio = (self.kills + self.assists) as f64 / self.deaths as f64;
        Kda::Ratio((ratio * 100.0).round() / 100.0)
    }

    /// `k/d/a`.
    pub fn score(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    /// Milliseconds since the epoch.
    pub start_timestamp: i64,
    /// Seconds.
    pub duration: u64,
    pub outcome: MatchOutcome,
    pub participants: Vec<ParticipantRecord>,
    pub queue: QueueKind,
}

impl MatchRecord {
    pub fn participant(&self, puuid: &str) -> Option<&ParticipantRecord> {
        self.participants.iter().find(|p| p.puuid == puuid)
    }

    pub fn is_remake(&self) -> bool {
        self.outcome == MatchOutcome::Remake
    }

    /// Whether `puuid` won. `None` for remakes or when the player is absent.
    pub fn won_by(&self, puuid: &str) -> Option<bool> {
        let side = self.participant(puuid)?.side;
        self.outcome.winner().map(|winner| winner == side)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn participant(puuid: &str, side: Side, k: u32, d: u32, a: u32) -> ParticipantRecord {
        ParticipantRecord {
            puuid: puuid.to_string(),
            riot_name: puuid.to_string(),
            side,
            kills: k,
            deaths: d,
            assists: a,
            champion_id: 1,
            champion_name: "Annie".to_string(),
            gold: 0,
            damage: 0,
            creep_score: 0,
            vision_score: 0,
            position: "MIDDLE".to_string(),
            multikills: [0; 4],
        }
    }
}
