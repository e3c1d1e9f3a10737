//! Composes client calls into domain snapshots and match records.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::client::ThrottledClient;
use crate::domain::{
    MasteryEntry, MatchRecord, Queue, Snapshot, TOP_MASTERY_COUNT, unranked_map,
};
use crate::error::{ApiError, ApiResult};

/// Read access to upstream player data.
#[async_trait]
pub trait PlayerSource: Send + Sync {
    /// Up to `count` match ids, most recent first.
    async fn match_ids(&self, puuid: &str, count: usize) -> ApiResult<Vec<String>>;

    async fn snapshot(&self, puuid: &str) -> ApiResult<Snapshot>;

    async fn match_record(&self, match_id: &str) -> ApiResult<MatchRecord>;
}

/// [`PlayerSource`] backed by a [`ThrottledClient`].
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    client: Arc<ThrottledClient>,
}

impl SnapshotFetcher {
    pub fn new(client: Arc<ThrottledClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ThrottledClient> {
        &self.client
    }

    /// Build a snapshot: account, summoner, league entries, then mastery.
    ///
    /// The first failing call aborts the fetch and its error is returned
    /// unchanged.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, puuid: &str) -> ApiResult<Snapshot> {
        let account = self.client.account_by_puuid(puuid).await?;
        let summoner = self.client.summoner_by_puuid(puuid).await?;

        let mut ranks = unranked_map();
        for entry in self.client.league_entries_by_puuid(puuid).await? {
            let Some(queue) = Queue::from_api_name(&entry.queue_type) else {
                continue;
            };
            match entry.to_rank() {
                Some(rank) => {
                    ranks.insert(queue, rank);
                }
                None => debug!(puuid, tier = %entry.tier, "ignoring unknown league tier"),
            }
        }

        let mut mastery: Vec<MasteryEntry> = self
            .client
            .mastery_by_puuid(puuid)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        mastery.sort_by(|a, b| b.points.cmp(&a.points));
        let total_mastery_level = mastery.iter().map(|m| m.level as u64).sum();
        let total_mastery_points = mastery.iter().map(|m| m.points).sum();
        mastery.truncate(TOP_MASTERY_COUNT);

        Ok(Snapshot {
            puuid: puuid.to_string(),
            game_name: account.game_name.unwrap_or_default(),
            tag_line: account.tag_line.unwrap_or_default(),
            level: summoner.summoner_level,
            icon: summoner.profile_icon_id,
            ranks,
            top_mastery: mastery,
            total_mastery_level,
            total_mastery_points,
        })
    }

    pub async fn fetch_match(&self, match_id: &str) -> ApiResult<MatchRecord> {
        let record: MatchRecord = self.client.match_by_id(match_id).await?.into();
        if record.id != match_id {
            return Err(ApiError::inconsistency(format!(
                "requested match {match_id}, received {}",
                record.id
            )));
        }
        Ok(record)
    }

    pub async fn match_ids(&self, puuid: &str, count: usize) -> ApiResult<Vec<String>> {
        self.client.match_ids_by_puuid(puuid, count).await
    }

    /// Look up a player by riot id and fetch their snapshot.
    pub async fn resolve_riot_id(&self, game_name: &str, tag_line: &str) -> ApiResult<Snapshot> {
        let account = self.client.account_by_riot_id(game_name, tag_line).await?;
        self.fetch(&account.puuid).await
    }
}

#[async_trait]
impl PlayerSource for SnapshotFetcher {
    async fn match_ids(&self, puuid: &str, count: usize) -> ApiResult<Vec<String>> {
        SnapshotFetcher::match_ids(self, puuid, count).await
    }

    async fn snapshot(&self, puuid: &str) -> ApiResult<Snapshot> {
        self.fetch(puuid).await
    }

    async fn match_record(&self, match_id: &str) -> ApiResult<MatchRecord> {
        self.fetch_match(match_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::client::test_support::ScriptedTransport;
    use crate::domain::{Division, MatchOutcome, RankValue, Tier};
    use crate::error::ServerErrorKind;
    use crate::transport::RawResponse;
    use crate::wire::fixtures::{match_payload, participant};
    use serde_json::json;

    fn fetcher(transport: Arc<ScriptedTransport>) -> SnapshotFetcher {
        let client =
            ThrottledClient::with_transport(ClientConfig::new("k", "euw1", "europe"), transport)
                .unwrap();
        SnapshotFetcher::new(Arc::new(client))
    }

    fn route_profile(transport: &ScriptedTransport, puuid: &str) {
        transport
            .route(
                &format!("/riot/account/v1/accounts/by-puuid/{puuid}"),
                RawResponse::json(
                    200,
                    json!({"puuid": puuid, "gameName": "Faker", "tagLine": "KR1"}),
                ),
            )
            .route(
                &format!("/lol/summoner/v4/summoners/by-puuid/{puuid}"),
                RawResponse::json(
                    200,
                    json!({"puuid": puuid, "profileIconId": 29, "summonerLevel": 412}),
                ),
            )
            .route(
                &format!("/lol/league/v4/entries/by-puuid/{puuid}"),
                RawResponse::json(
                    200,
                    json!([{
                        "queueType": "RANKED_SOLO_5x5",
                        "tier": "GOLD",
                        "rank": "II",
                        "leaguePoints": 45,
                        "wins": 10,
                        "losses": 8,
                    }, {
                        "queueType": "CHERRY",
                        "tier": "GOLD",
                        "rank": "I",
                        "leaguePoints": 0,
                        "wins": 1,
                        "losses": 1,
                    }]),
                ),
            )
            .route(
                &format!("/lol/champion-mastery/v4/champion-masteries/by-puuid/{puuid}"),
                RawResponse::json(
                    200,
                    json!([
                        {"championId": 1, "championLevel": 5, "championPoints": 100},
                        {"championId": 2, "championLevel": 7, "championPoints": 900},
                        {"championId": 3, "championLevel": 4, "championPoints": 50},
                        {"championId": 4, "championLevel": 6, "championPoints": 400},
                    ]),
                ),
            );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_snapshot() {
        let transport = Arc::new(ScriptedTransport::default());
        route_profile(&transport, "p1");
        let fetcher = fetcher(transport);

        let snapshot = fetcher.fetch("p1").await.unwrap();

        assert_eq!(snapshot.game_name, "Faker");
        assert_eq!(snapshot.level, 412);
        assert_eq!(
            snapshot.rank(Queue::SoloDuo),
            RankValue::new(Division::Gold, Some(Tier::II), 45, 10, 8)
        );
        assert_eq!(snapshot.rank(Queue::Flex), RankValue::unranked());
        assert_eq!(snapshot.ranks.len(), 2);

        let top: Vec<u32> = snapshot.top_mastery.iter().map(|m| m.champion_id).collect();
        assert_eq!(top, vec![2, 4, 1]);
        assert_eq!(snapshot.total_mastery_level, 22);
        assert_eq!(snapshot.total_mastery_points, 1450);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_stops_at_first_error() {
        let transport = Arc::new(ScriptedTransport::default());
        transport
            .route(
                "/riot/account/v1/accounts/by-puuid/p1",
                RawResponse::json(200, json!({"puuid": "p1"})),
            )
            .route(
                "/lol/summoner/v4/summoners/by-puuid/p1",
                RawResponse::empty(503),
            );
        let fetcher = fetcher(transport.clone());

        let err = fetcher.fetch("p1").await.unwrap_err();
        assert_eq!(err, ApiError::Server(ServerErrorKind::Unavailable));
        assert_eq!(
            transport.requests_to("/lol/league/v4/entries/by-puuid/p1"),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_match() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.route(
            "/lol/match/v5/matches/EUW1_9",
            RawResponse::json(
                200,
                match_payload(
                    "EUW1_9",
                    5_000,
                    1_500,
                    vec![
                        participant("p1", 100, false, (0, 5, 1)),
                        participant("p2", 200, true, (9, 0, 4)),
                    ],
                ),
            ),
        );
        let fetcher = fetcher(transport);

        let record = fetcher.match_record("EUW1_9").await.unwrap();
        assert_eq!(record.outcome, MatchOutcome::RedWin);
        assert_eq!(record.start_timestamp, 5_000);
        assert_eq!(record.won_by("p1"), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_riot_id() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.route(
            "/riot/account/v1/accounts/by-riot-id/Faker/KR1",
            RawResponse::json(200, json!({"puuid": "p1", "gameName": "Faker", "tagLine": "KR1"})),
        );
        route_profile(&transport, "p1");
        let fetcher = fetcher(transport);

        let snapshot = fetcher.resolve_riot_id("Faker", "KR1").await.unwrap();
        assert_eq!(snapshot.puuid, "p1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_ids() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.route(
            "/lol/match/v5/matches/by-puuid/p1/ids",
            RawResponse::json(200, json!(["EUW1_3", "EUW1_2", "EUW1_1"])),
        );
        let fetcher = fetcher(transport);

        let ids = PlayerSource::match_ids(&fetcher, "p1", 3).await.unwrap();
        assert_eq!(ids, vec!["EUW1_3", "EUW1_2", "EUW1_1"]);
    }
}
