//! Rate-limited, cached client for the Riot Games API.
//!
//! [`ThrottledClient`] performs the raw calls, enforcing the application rate
//! limits and caching answers per endpoint. [`SnapshotFetcher`] composes those
//! calls into [`Snapshot`]s and [`MatchRecord`]s for consumers that depend on
//! the [`PlayerSource`] trait.

pub mod cache;
pub mod client;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod fetcher;
pub mod rate_limiter;
pub mod transport;
pub mod wire;

pub use client::{ClientConfig, ThrottledClient};
pub use domain::*;
pub use endpoint::{CacheTtls, Endpoint};
pub use error::{ApiError, ApiResult, ServerErrorKind};
pub use fetcher::{PlayerSource, SnapshotFetcher};
pub use rate_limiter::{WindowLimiter, WindowLimiterConfig};
pub use transport::{RawResponse, ReqwestTransport, Transport};
