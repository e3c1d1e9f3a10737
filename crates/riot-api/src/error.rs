use thiserror::Error;

/// Result of every remote call made through the client.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Upstream 5xx flavours the API is known to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorKind {
    Internal,
    BadGateway,
    Unavailable,
    GatewayTimeout,
}

impl ServerErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            ServerErrorKind::Internal => 500,
            ServerErrorKind::BadGateway => 502,
            ServerErrorKind::Unavailable => 503,
            ServerErrorKind::GatewayTimeout => 504,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("riot api key is invalid")]
    InvalidCredentials,
    #[error("resource not found")]
    NotFound,
    #[error("riot api was rate-limited")]
    RateLimited,
    #[error("riot api server error ({})", .0.status())]
    Server(ServerErrorKind),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("data inconsistency: {0}")]
    DataInconsistency(String),
}

impl ApiError {
    /// Classify an HTTP status.
    ///
    /// Returns `None` for 200.
    ///
    /// # Panics
    ///
    /// Panics on any status outside the known table. An unmapped status means
    /// the client and the upstream disagree on the contract, which is not a
    /// condition callers can recover from.
    pub fn from_status(status: u16) -> Option<ApiError> {
        match status {
            200 => None,
            401 | 403 => Some(ApiError::InvalidCredentials),
            404 => Some(ApiError::NotFound),
            429 => Some(ApiError::RateLimited),
            500 => Some(ApiError::Server(ServerErrorKind::Internal)),
            502 => Some(ApiError::Server(ServerErrorKind::BadGateway)),
            503 => Some(ApiError::Server(ServerErrorKind::Unavailable)),
            504 => Some(ApiError::Server(ServerErrorKind::GatewayTimeout)),
            other => panic!("unmapped riot api status {other}"),
        }
    }

    /// Stable tag for callers that phrase their own user-facing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidCredentials => "invalid-credentials",
            ApiError::NotFound => "not-found",
            ApiError::RateLimited => "rate-limited",
            ApiError::Server(_) => "server-error",
            ApiError::Connection(_) => "connection-error",
            ApiError::DataInconsistency(_) => "data-inconsistency",
        }
    }

    pub fn inconsistency(msg: impl Into<String>) -> Self {
        ApiError::DataInconsistency(msg.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::DataInconsistency(e.to_string())
    }
}
