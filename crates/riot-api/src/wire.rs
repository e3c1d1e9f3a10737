//! Upstream payloads.
//!
//! Only the consumed fields are declared. Anything else in the payloads is
//! ignored, and a missing required field surfaces as a decode error that the
//! fetcher reports as a data inconsistency.

use serde::Deserialize;

use crate::domain::{
    Division, MasteryEntry, MatchOutcome, MatchRecord, ParticipantRecord, QueueKind,
    REMAKE_THRESHOLD_SECS, RankValue, Side, Tier,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub puuid: String,
    pub profile_icon_id: u32,
    pub summoner_level: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    pub queue_type: String,
    pub tier: String,
    #[serde(default)]
    pub rank: Option<String>,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
}

impl LeagueEntryDto {
    /// `None` when the division is not one we know.
    pub fn to_rank(&self) -> Option<RankValue> {
        let division = Division::parse(&self.tier)?;
        let tier = self.rank.as_deref().and_then(Tier::parse);
        Some(RankValue::new(
            division,
            tier,
            self.league_points,
            self.wins,
            self.losses,
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryDto {
    pub champion_id: u32,
    pub champion_level: u32,
    pub champion_points: u64,
    #[serde(default)]
    pub last_play_time: i64,
}

impl From<MasteryDto> for MasteryEntry {
    fn from(dto: MasteryDto) -> Self {
        Self {
            champion_id: dto.champion_id,
            level: dto.champion_level,
            points: dto.champion_points,
            last_play_time: dto.last_play_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    pub metadata: MatchMetadataDto,
    pub info: MatchInfoDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadataDto {
    pub match_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfoDto {
    pub game_start_timestamp: i64,
    pub game_duration: u64,
    pub queue_id: u32,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    #[serde(default)]
    pub riot_id_game_name: Option<String>,
    #[serde(default)]
    pub summoner_name: Option<String>,
    pub team_id: u32,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub champion_id: u32,
    pub champion_name: String,
    #[serde(default)]
    pub gold_earned: u32,
    #[serde(default)]
    pub total_damage_dealt_to_champions: u32,
    #[serde(default)]
    pub total_minions_killed: u32,
    #[serde(default)]
    pub neutral_minions_killed: u32,
    #[serde(default)]
    pub vision_score: u32,
    #[serde(default)]
    pub individual_position: String,
    #[serde(default)]
    pub double_kills: u32,
    #[serde(default)]
    pub triple_kills: u32,
    #[serde(default)]
    pub quadra_kills: u32,
    #[serde(default)]
    pub penta_kills: u32,
}

impl From<ParticipantDto> for ParticipantRecord {
    fn from(dto: ParticipantDto) -> Self {
        let riot_name = dto
            .riot_id_game_name
            .filter(|n| !n.is_empty())
            .or(dto.summoner_name)
            .unwrap_or_default();

        Self {
            puuid: dto.puuid,
            riot_name,
            side: Side::from_team_id(dto.team_id),
            kills: dto.kills,
            deaths: dto.deaths,
            assists: dto.assists,
            champion_id: dto.champion_id,
            champion_name: dto.champion_name,
            gold: dto.gold_earned,
            damage: dto.total_damage_dealt_to_champions,
            creep_score: dto.total_minions_killed + dto.neutral_minions_killed,
            vision_score: dto.vision_score,
            position: dto.individual_position,
            multikills: [
                dto.double_kills,
                dto.triple_kills,
                dto.quadra_kills,
                dto.penta_kills,
            ],
        }
    }
}

impl From<MatchDto> for MatchRecord {
    fn from(dto: MatchDto) -> Self {
        let info = dto.info;
        let red_won = info
            .participants
            .iter()
            .any(|p| p.win && Side::from_team_id(p.team_id) == Side::Red);

        let outcome = if info.game_duration < REMAKE_THRESHOLD_SECS {
            MatchOutcome::Remake
        } else if red_won {
            MatchOutcome::RedWin
        } else {
            MatchOutcome::BlueWin
        };

        Self {
            id: dto.metadata.match_id,
            start_timestamp: info.game_start_timestamp,
            duration: info.game_duration,
            outcome,
            participants: info.participants.into_iter().map(Into::into).collect(),
            queue: QueueKind::from_queue_id(info.queue_id),
        }
    }
}
