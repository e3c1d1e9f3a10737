use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{ApiError, ApiResult};

/// Routing host family of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Platform host, e.g. `euw1`.
    Platform,
    /// Regional host, e.g. `europe`.
    Region,
}

/// Remote operations consumed by the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AccountByPuuid,
    AccountByRiotId,
    SummonerByPuuid,
    LeagueEntriesByPuuid,
    MasteryByPuuid,
    MatchIdsByPuuid,
    MatchById,
}

impl Endpoint {
    pub fn routing(&self) -> Routing {
        match self {
            Endpoint::SummonerByPuuid
            | Endpoint::LeagueEntriesByPuuid
            | Endpoint::MasteryByPuuid => Routing::Platform,
            Endpoint::AccountByPuuid
            | Endpoint::AccountByRiotId
            | Endpoint::MatchIdsByPuuid
            | Endpoint::MatchById => Routing::Region,
        }
    }

    /// Static path segments preceding the arguments.
    fn segments(&self) -> &'static [&'static str] {
        match self {
            Endpoint::AccountByPuuid => &["riot", "account", "v1", "accounts", "by-puuid"],
            Endpoint::AccountByRiotId => &["riot", "account", "v1", "accounts", "by-riot-id"],
            Endpoint::SummonerByPuuid => &["lol", "summoner", "v4", "summoners", "by-puuid"],
            Endpoint::LeagueEntriesByPuuid => &["lol", "league", "v4", "entries", "by-puuid"],
            Endpoint::MasteryByPuuid => &[
                "lol",
                "champion-mastery",
                "v4",
                "champion-masteries",
                "by-puuid",
            ],
            Endpoint::MatchIdsByPuuid => &["lol", "match", "v5", "matches", "by-puuid"],
            Endpoint::MatchById => &["lol", "match", "v5", "matches"],
        }
    }

    fn expected_args(&self) -> usize {
        match self {
            Endpoint::AccountByRiotId | Endpoint::MatchIdsByPuuid => 2,
            _ => 1,
        }
    }

    /// Build the request URL below `base`, appending the api key.
    ///
    /// Arguments are percent-encoded as individual path segments, so riot ids
    /// containing spaces or non-ASCII characters are safe to pass as-is.
    pub fn url(&self, base: &Url, args: &[String], api_key: &str) -> ApiResult<Url> {
        if args.len() != self.expected_args() {
            return Err(ApiError::inconsistency(format!(
                "{self} expects {} arguments, got {}",
                self.expected_args(),
                args.len()
            )));
        }

        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::inconsistency(format!("cannot-be-a-base url {base}")))?;
            path.pop_if_empty().extend(self.segments());
            match self {
                Endpoint::MatchIdsByPuuid => {
                    path.push(&args[0]).push("ids");
                }
                _ => {
                    path.extend(args);
                }
            }
        }

        {
            let mut query = url.query_pairs_mut();
            if let Endpoint::MatchIdsByPuuid = self {
                query.append_pair("start", "0").append_pair("count", &args[1]);
            }
            query.append_pair("api_key", api_key);
        }

        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::AccountByPuuid => "account-by-puuid",
            Endpoint::AccountByRiotId => "account-by-riot-id",
            Endpoint::SummonerByPuuid => "summoner-by-puuid",
            Endpoint::LeagueEntriesByPuuid => "league-entries-by-puuid",
            Endpoint::MasteryByPuuid => "mastery-by-puuid",
            Endpoint::MatchIdsByPuuid => "match-ids-by-puuid",
            Endpoint::MatchById => "match-by-id",
        };
        f.write_str(name)
    }
}

/// Cache lifetimes per endpoint family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTtls {
    pub account: Duration,
    pub summoner: Duration,
    pub match_ids: Duration,
    pub match_detail: Duration,
    pub league: Duration,
    pub mastery: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            account: Duration::from_secs(12 * 60 * 60),
            summoner: Duration::from_secs(270),
            match_ids: Duration::from_secs(120),
            match_detail: Duration::from_secs(300),
            league: Duration::from_secs(120),
            mastery: Duration::from_secs(120),
        }
    }
}

impl CacheTtls {
    pub fn for_endpoint(&self, endpoint: Endpoint) -> Duration {
        match endpoint {
            Endpoint::AccountByPuuid | Endpoint::AccountByRiotId => self.account,
            Endpoint::SummonerByPuuid => self.summoner,
            Endpoint::MatchIdsByPuuid => self.match_ids,
            Endpoint::MatchById => self.match_detail,
            Endpoint::LeagueEntriesByPuuid => self.league,
            Endpoint::MasteryByPuuid => self.mastery,
        }
    }
}
