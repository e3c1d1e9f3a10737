//! Sliding-window rate limiting for upstream API calls.
//!
//! Each window tracks the calls currently in flight and the calls completed
//! since the window opened. A caller reserves a slot before sending and
//! reports completion afterwards, optionally with the upstream's own count
//! so the local view can catch up after a restart.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Configuration for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowLimiterConfig {
    /// Calls allowed per window.
    pub max_calls: u32,
    /// Window length.
    pub window: Duration,
    /// Position of this window in the comma-separated count header.
    pub header_index: usize,
}

impl WindowLimiterConfig {
    pub fn new(max_calls: u32, window: Duration, header_index: usize) -> Self {
        Self {
            max_calls,
            window,
            header_index,
        }
    }

    /// The two application windows of a development key.
    pub fn app_defaults() -> Vec<Self> {
        vec![
            Self::new(20, Duration::from_secs(1), 0),
            Self::new(100, Duration::from_secs(121), 1),
        ]
    }
}

impl Default for WindowLimiterConfig {
    fn default() -> Self {
        Self::new(20, Duration::from_secs(1), 0)
    }
}

#[derive(Debug, Default)]
struct WindowState {
    started: Option<Instant>,
    active: u32,
    completed: u32,
}

impl WindowState {
    /// Start a fresh window if the current one has elapsed.
    fn roll(&mut self, now: Instant, window: Duration) {
        match self.started {
            Some(started) if now < started + window => {}
            _ => {
                self.started = Some(now);
                self.completed = 0;
            }
        }
    }

    fn used(&self) -> u32 {
        self.completed + self.active
    }
}

/// Counts of one window, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub active: u32,
    pub completed: u32,
    pub max_calls: u32,
}

#[derive(Debug)]
pub struct WindowLimiter {
    config: WindowLimiterConfig,
    state: Mutex<WindowState>,
}

impl WindowLimiter {
    pub fn new(config: WindowLimiterConfig) -> Self {
        Self {
            config,
            state: Mutex::new(WindowState::default()),
        }
    }

    pub fn config(&self) -> &WindowLimiterConfig {
        &self.config
    }

    /// Reserve a slot, sleeping until the window resets when it is full.
    ///
    /// Returns the total time spent waiting.
    ///
    /// # Cancel Safety
    ///
    /// The lock is never held across the sleep. A reservation is only taken
    /// once the call returns, so dropping the future while it waits leaves the
    /// window untouched.
    pub async fn reserve(&self) -> Duration {
        let mut total_wait = Duration::ZERO;

        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                state.roll(now, self.config.window);

                if state.used() < self.config.max_calls {
                    state.active += 1;
                    return total_wait;
                }

                // `roll` guarantees `started` is set.
                let started = state.started.unwrap_or(now);
                (started + self.config.window).saturating_duration_since(now)
            };

            trace!(
                max_calls = self.config.max_calls,
                window = ?self.config.window,
                wait = ?wait,
                "window full"
            );
            tokio::time::sleep(wait).await;
            total_wait += wait;
        }
    }

    /// Release a reservation and record it as completed.
    ///
    /// `count_header` is the raw rate-limit count header, if the upstream sent
    /// one. When it reports more calls than are known locally the local count
    /// is raised to match.
    pub async fn complete(&self, count_header: Option<&str>) {
        let mut state = self.state.lock().await;
        state.active = state.active.saturating_sub(1);
        state.completed += 1;

        if let Some(count) =
            count_header.and_then(|h| parse_rate_limit_count(h, self.config.header_index))
            && count > state.used()
        {
            debug!(
                local = state.used(),
                upstream = count,
                header_index = self.config.header_index,
                "adopting upstream call count"
            );
            state.completed = count;
        }
    }

    /// Mark the window as exhausted after an upstream rate-limit rejection.
    pub async fn saturate(&self) {
        let mut state = self.state.lock().await;
        state.roll(Instant::now(), self.config.window);
        state.completed = state.completed.max(self.config.max_calls);
    }

    pub async fn snapshot(&self) -> WindowSnapshot {
        let state = self.state.lock().await;
        WindowSnapshot {
            active: state.active,
            completed: state.completed,
            max_calls: self.config.max_calls,
        }
    }
}

/// Extract the call count at `index` from a `"count:window,count:window"` header.
pub fn parse_rate_limit_count(header: &str, index: usize) -> Option<u32> {
    let entry = header.split(',').nth(index)?;
    let (count, _window) = entry.trim().split_once(':')?;
    count.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(max_calls: u32, window_secs: u64) -> WindowLimiter {
        WindowLimiter::new(WindowLimiterConfig::new(
            max_calls,
            Duration::from_secs(window_secs),
            0,
        ))
    }

    #[test]
    fn test_parse_rate_limit_count() {
        assert_eq!(parse_rate_limit_count("3:1,40:120", 0), Some(3));
        assert_eq!(parse_rate_limit_count("3:1,40:120", 1), Some(40));
        assert_eq!(parse_rate_limit_count("3:1", 1), None);
        assert_eq!(parse_rate_limit_count("garbage", 0), None);
        assert_eq!(parse_rate_limit_count(" 7:1 , 9:120", 1), Some(9));
    }

    #[test]
    fn test_app_defaults() {
        let windows = WindowLimiterConfig::app_defaults();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].max_calls, 20);
        assert_eq!(windows[1].window, Duration::from_secs(121));
        assert_eq!(windows[1].header_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reserve_within_budget_does_not_wait() {
        let limiter = limiter(2, 10);

        assert_eq!(limiter.reserve().await, Duration::ZERO);
        limiter.complete(None).await;
        assert_eq!(limiter.reserve().await, Duration::ZERO);
        limiter.complete(None).await;

        let snapshot = limiter.snapshot().await;
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.active, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reserve_waits_for_window_reset() {
        let limiter = limiter(2, 10);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.reserve().await;
            limiter.complete(None).await;
        }

        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_reservations_count_against_budget() {
        let limiter = Arc::new(limiter(1, 5));
        limiter.reserve().await;

        // Still in flight: the second caller must wait for the reset.
        let waiting = limiter.clone();
        let handle = tokio::spawn(async move { waiting.reserve().await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        limiter.complete(None).await;

        let wait = handle.await.unwrap();
        assert_eq!(wait, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_count_raises_local_count() {
        let limiter = limiter(5, 10);
        limiter.reserve().await;
        limiter.complete(Some("5:10,50:120")).await;

        assert_eq!(limiter.snapshot().await.completed, 5);

        let start = Instant::now();
        limiter.reserve().await;
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_count_never_lowers_local_count() {
        let limiter = limiter(5, 10);
        for _ in 0..3 {
            limiter.reserve().await;
            limiter.complete(Some("1:10")).await;
        }
        assert_eq!(limiter.snapshot().await.completed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saturate_blocks_until_reset() {
        let limiter = limiter(3, 4);
        limiter.saturate().await;

        let wait = limiter.reserve().await;
        assert_eq!(wait, Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reserve_cancel_safe() {
        let limiter = Arc::new(limiter(1, 2));
        limiter.reserve().await;
        limiter.complete(None).await;

        let waiting = limiter.clone();
        let handle = tokio::spawn(async move { waiting.reserve().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.abort();
        let _ = handle.await;

        let snapshot = limiter.snapshot().await;
        assert_eq!(snapshot.active, 0);

        let wait = limiter.reserve().await;
        assert!(wait <= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reserve() {
        let limiter = Arc::new(limiter(5, 1));
        let mut handles = vec![];

        for _ in 0..10 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.reserve().await;
                limiter.complete(None).await;
            }));
        }

        let result =
            tokio::time::timeout(Duration::from_secs(5), futures::future::join_all(handles)).await;
        assert!(result.is_ok(), "concurrent reservations should not deadlock");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reserve_respects_window_budget() {
        let limiter = Arc::new(limiter(5, 5));
        let start = Instant::now();
        let mut handles = vec![];

        for _ in 0..17 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.reserve().await;
                let started = start.elapsed();
                limiter.complete(None).await;
                started
            }));
        }

        let mut starts: Vec<Duration> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        starts.sort();

        // No 5s span holds more than 5 calls.
        for (i, first) in starts.iter().enumerate() {
            let in_window = starts[i..]
                .iter()
                .take_while(|s| **s < *first + Duration::from_secs(5))
                .count();
            assert!(in_window <= 5, "{in_window} calls within 5s of {first:?}");
        }

        let secs: Vec<u64> = starts.iter().map(|s| s.as_secs()).collect();
        let mut expected = vec![0; 5];
        expected.extend([5; 5]);
        expected.extend([10; 5]);
        expected.extend([15; 2]);
        assert_eq!(secs, expected);
    }
}
