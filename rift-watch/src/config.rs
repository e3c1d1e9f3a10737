//! Process configuration read from the environment.
//!
//! Supported variables:
//! - `RIOT_TOKEN` (required): API key
//! - `SERVER`: platform routing value, default `euw1`
//! - `REGION`: regional routing value, default `europe`
//! - `FILES_PATH` (required): directory for `memory.json`
//! - `API_THREADS`: concurrent upstream requests, default 5
//! - `POLL_INTERVAL_SECS`: seconds between polls, default 300
//! - `HISTORY_COUNT`: match-id window per poll, default 20
//! - `LOG_DIR`: enables the rolling file log

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use riot_api::ClientConfig;

use crate::monitor::MonitorConfig;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub riot_token: String,
    pub server: String,
    pub region: String,
    pub files_path: PathBuf,
    pub api_threads: usize,
    pub poll_interval: Duration,
    pub history_count: usize,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| Error::config(format!("{key} must be set")))
        };

        let config = Self {
            riot_token: required("RIOT_TOKEN")?,
            server: get("SERVER").unwrap_or_else(|| "euw1".to_string()),
            region: get("REGION").unwrap_or_else(|| "europe".to_string()),
            files_path: PathBuf::from(required("FILES_PATH")?),
            api_threads: parse_or(get("API_THREADS"), "API_THREADS", 5)?,
            poll_interval: Duration::from_secs(parse_or(
                get("POLL_INTERVAL_SECS"),
                "POLL_INTERVAL_SECS",
                300,
            )?),
            history_count: parse_or(get("HISTORY_COUNT"), "HISTORY_COUNT", 20)?,
            log_dir: get("LOG_DIR").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_threads == 0 {
            return Err(Error::config("API_THREADS must be at least 1"));
        }
        if self.history_count == 0 || self.history_count > 100 {
            return Err(Error::config("HISTORY_COUNT must be between 1 and 100"));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::config("POLL_INTERVAL_SECS must be positive"));
        }
        Ok(())
    }

    /// Create the files directory if missing.
    pub fn ensure_files_path(&self) -> Result<()> {
        std::fs::create_dir_all(&self.files_path)?;
        Ok(())
    }

    pub fn memory_file(&self) -> PathBuf {
        self.files_path.join(crate::store::JsonFileStore::FILENAME)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            max_concurrent_requests: self.api_threads,
            ..ClientConfig::new(&self.riot_token, &self.server, &self.region)
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            history_count: self.history_count,
            ..MonitorConfig::default()
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("{key} has invalid value {v:?}"))),
    }
}
