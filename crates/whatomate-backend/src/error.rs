//! Error types for whatomate-backend.

use std::fmt;
use std::time::Duration;

use deadpool_redis::redis::RedisError;
use deadpool_redis::{CreatePoolError, PoolError};
use thiserror::Error;

/// Result type alias using [`ConnectionError`].
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Which backing service an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// PostgreSQL.
    Database,
    /// Redis.
    Cache,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => f.write_str("database"),
            Self::Cache => f.write_str("redis"),
        }
    }
}

/// Failures while establishing a verified backend connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The PostgreSQL URL or connection options could not be parsed.
    #[error("invalid database connection settings: {0}")]
    InvalidDatabaseTarget(#[source] sqlx::Error),

    /// PostgreSQL refused the connection or failed the liveness check.
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),

    /// The Redis URL could not be parsed.
    #[error("failed to parse redis URL: {0}")]
    InvalidCacheUrl(#[source] RedisError),

    /// The Redis pool could not be built.
    #[error("failed to create redis pool: {0}")]
    CachePool(#[from] CreatePoolError),

    /// No Redis connection could be checked out.
    #[error("failed to connect to redis: {0}")]
    CacheUnavailable(#[from] PoolError),

    /// Redis answered the liveness check with an error.
    #[error("redis liveness check failed: {0}")]
    Cache(#[source] RedisError),

    /// The backend did not answer within the configured timeout.
    #[error("{backend} did not answer within {}s", .after.as_secs())]
    Timeout {
        /// Backend that timed out.
        backend: Backend,
        /// Configured bound.
        after: Duration,
    },
}

impl ConnectionError {
    /// The backend this error refers to.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self {
            Self::InvalidDatabaseTarget(_) | Self::Database(_) => Backend::Database,
            Self::InvalidCacheUrl(_)
            | Self::CachePool(_)
            | Self::CacheUnavailable(_)
            | Self::Cache(_) => Backend::Cache,
            Self::Timeout { backend, .. } => *backend,
        }
    }

    /// True when the settings were unusable, as opposed to the backend being
    /// unreachable.
    #[must_use]
    pub const fn is_invalid_target(&self) -> bool {
        matches!(
            self,
            Self::InvalidDatabaseTarget(_) | Self::InvalidCacheUrl(_)
        )
    }
}
