use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use riot_api::{SnapshotFetcher, ThrottledClient};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use rift_watch::config::AppConfig;
use rift_watch::logging::init_logging;
use rift_watch::monitor::PlayerMonitor;
use rift_watch::notification::LogNotifier;
use rift_watch::scheduler::Watcher;
use rift_watch::store::{JsonFileStore, Store};

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    config.ensure_files_path()?;

    let (logging, _log_guard) = init_logging(config.log_dir.as_deref())?;

    info!(
        server = %config.server,
        region = %config.region,
        api_threads = config.api_threads,
        "rift-watch starting"
    );

    let client = Arc::new(ThrottledClient::new(config.client_config())?);
    let fetcher = Arc::new(SnapshotFetcher::new(client.clone()));
    let monitor = Arc::new(PlayerMonitor::with_config(fetcher, config.monitor_config()));

    let store = Arc::new(JsonFileStore::new(config.memory_file()));
    let state = store.load().await?;
    info!(
        players = state.all_tracked_ids().len(),
        scopes = state.active_scopes().len(),
        "tracking state loaded"
    );

    let watcher = Watcher::new(
        monitor,
        Arc::new(LogNotifier),
        store,
        state,
        config.poll_interval,
    );

    let cancel_token = CancellationToken::new();
    logging.start_retention_cleanup(cancel_token.child_token());
    spawn_cache_sweeper(client, cancel_token.child_token());

    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
        shutdown.cancel();
    });

    watcher.run(cancel_token).await;
    info!("rift-watch stopped");
    Ok(())
}

fn spawn_cache_sweeper(client: Arc<ThrottledClient>, cancel_token: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => {
                    let removed = client.cache().cleanup_expired();
                    let stats = client.cache().stats();
                    debug!(
                        removed,
                        entries = stats.entry_count,
                        requests = client.stats().requests(),
                        cache_hits = client.stats().cache_hits(),
                        rate_limited = client.stats().rate_limited(),
                        "swept response cache"
                    );
                }
            }
        }
    });
}
