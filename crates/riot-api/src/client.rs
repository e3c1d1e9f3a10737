//! Throttled, cached access to the Riot API.
//!
//! Every call goes through, in order:
//! 1. the response cache (a hit skips everything below),
//! 2. a semaphore bounding in-flight requests,
//! 3. every configured rate-limit window,
//! 4. the transport.
//!
//! A 429 answer saturates the windows and is retried once after a fixed
//! delay, so callers only ever observe a second consecutive rejection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};
use url::Url;

use crate::cache::{CacheKey, ResponseCache};
use crate::endpoint::{CacheTtls, Endpoint, Routing};
use crate::error::{ApiError, ApiResult};
use crate::rate_limiter::{WindowLimiter, WindowLimiterConfig};
use crate::transport::{RawResponse, ReqwestTransport, Transport};
use crate::wire::{AccountDto, LeagueEntryDto, MasteryDto, MatchDto, SummonerDto};

/// Configuration for [`ThrottledClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    /// Platform routing value, e.g. `euw1`.
    pub platform: String,
    /// Regional routing value, e.g. `europe`.
    pub region: String,
    pub max_concurrent_requests: usize,
    pub windows: Vec<WindowLimiterConfig>,
    /// Pause before retrying a rate-limited call.
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub ttls: CacheTtls,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            platform: "euw1".to_string(),
            region: "europe".to_string(),
            max_concurrent_requests: 5,
            windows: WindowLimiterConfig::app_defaults(),
            retry_delay: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            ttls: CacheTtls::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(
        api_key: impl Into<String>,
        platform: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            platform: platform.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn base_url(&self, routing: Routing) -> ApiResult<Url> {
        let host = match routing {
            Routing::Platform => &self.platform,
            Routing::Region => &self.region,
        };
        Url::parse(&format!("https://{host}.api.riotgames.com"))
            .map_err(|e| ApiError::inconsistency(format!("invalid routing value {host:?}: {e}")))
    }
}

/// Counters for diagnostics.
#[derive(Debug, Default)]
pub struct ClientStats {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    rate_limited: AtomicU64,
}

impl ClientStats {
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }
}

pub struct ThrottledClient {
    config: ClientConfig,
    platform_base: Url,
    region_base: Url,
    transport: Arc<dyn Transport>,
    semaphore: Semaphore,
    limiters: Vec<WindowLimiter>,
    cache: ResponseCache,
    stats: ClientStats,
}

impl std::fmt::Debug for ThrottledClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottledClient")
            .field("platform", &self.config.platform)
            .field("region", &self.config.region)
            .field("windows", &self.config.windows)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl ThrottledClient {
    /// Create a client backed by `reqwest`.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> ApiResult<Self> {
        let platform_base = config.base_url(Routing::Platform)?;
        let region_base = config.base_url(Routing::Region)?;
        let limiters = config
            .windows
            .iter()
            .cloned()
            .map(WindowLimiter::new)
            .collect();

        Ok(Self {
            semaphore: Semaphore::new(config.max_concurrent_requests.max(1)),
            platform_base,
            region_base,
            transport,
            limiters,
            cache: ResponseCache::new(),
            stats: ClientStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// Perform one logical call and return the decoded JSON body.
    pub async fn call(&self, endpoint: Endpoint, args: &[String]) -> ApiResult<Value> {
        let key = CacheKey::new(endpoint, args);
        if let Some(hit) = self.cache.get(&key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!(%endpoint, ?args, "cache hit");
            return hit;
        }

        let base = match endpoint.routing() {
            Routing::Platform => &self.platform_base,
            Routing::Region => &self.region_base,
        };
        let url = endpoint.url(base, args, &self.config.api_key)?;

        let response = match self.send(&url).await {
            Err(ApiError::RateLimited) => {
                self.stats.rate_limited.fetch_add(1, Ordering::Relaxed);
                warn!(
                    %endpoint,
                    delay = ?self.config.retry_delay,
                    "rate limited by upstream, retrying once"
                );
                tokio::time::sleep(self.config.retry_delay).await;
                self.send(&url).await
            }
            other => other,
        };

        if let Err(e) = &response {
            debug!(%endpoint, ?args, error = %e, "riot api call failed");
        }

        self.cache
            .insert(key, &response, self.config.ttls.for_endpoint(endpoint));
        response
    }

    /// One physical request under the semaphore and every window.
    async fn send(&self, url: &Url) -> ApiResult<Value> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ApiError::Connection("client semaphore closed".to_string()))?;

        for limiter in &self.limiters {
            let waited = limiter.reserve().await;
            if !waited.is_zero() {
                debug!(waited = ?waited, window = ?limiter.config().window, "waited for rate-limit window");
            }
        }

        self.stats.requests.fetch_add(1, Ordering::Relaxed);
        let result = self.transport.get(url).await;

        let header = result
            .as_ref()
            .ok()
            .and_then(|r| r.rate_limit_count.as_deref());
        for limiter in &self.limiters {
            limiter.complete(header).await;
        }

        let RawResponse { status, body, .. } = result?;
        match ApiError::from_status(status) {
            None => body.ok_or_else(|| ApiError::inconsistency(format!("empty body from {}", url.path()))),
            Some(ApiError::RateLimited) => {
                for limiter in &self.limiters {
                    limiter.saturate().await;
                }
                Err(ApiError::RateLimited)
            }
            Some(err) => Err(err),
        }
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        args: &[String],
    ) -> ApiResult<T> {
        let value = self.call(endpoint, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn account_by_puuid(&self, puuid: &str) -> ApiResult<AccountDto> {
        self.call_typed(Endpoint::AccountByPuuid, &[puuid.to_string()])
            .await
    }

    pub async fn account_by_riot_id(&self, game_name: &str, tag_line: &str) -> ApiResult<AccountDto> {
        self.call_typed(
            Endpoint::AccountByRiotId,
            &[game_name.to_string(), tag_line.to_string()],
        )
        .await
    }

    pub async fn summoner_by_puuid(&self, puuid: &str) -> ApiResult<SummonerDto> {
        self.call_typed(Endpoint::SummonerByPuuid, &[puuid.to_string()])
            .await
    }

    pub async fn league_entries_by_puuid(&self, puuid: &str) -> ApiResult<Vec<LeagueEntryDto>> {
        self.call_typed(Endpoint::LeagueEntriesByPuuid, &[puuid.to_string()])
            .await
    }

    pub async fn mastery_by_puuid(&self, puuid: &str) -> ApiResult<Vec<MasteryDto>> {
        self.call_typed(Endpoint::MasteryByPuuid, &[puuid.to_string()])
            .await
    }

    /// Most recent match ids first.
    pub async fn match_ids_by_puuid(&self, puuid: &str, count: usize) -> ApiResult<Vec<String>> {
        self.call_typed(
            Endpoint::MatchIdsByPuuid,
            &[puuid.to_string(), count.to_string()],
        )
        .await
    }

    pub async fn match_by_id(&self, match_id: &str) -> ApiResult<MatchDto> {
        self.call_typed(Endpoint::MatchById, &[match_id.to_string()])
            .await
    }
}
