//! Redis connector.

use std::fmt;
use std::time::Duration;

use deadpool_redis::redis::{
    self, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo,
};
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use tracing::{debug, info};
use whatomate_config::CacheSettings;

use crate::error::{Backend, ConnectionError, ConnectionResult};

/// A Redis pool that answered `PING` when it was created.
#[derive(Clone)]
pub struct CacheHandle {
    pool: Pool,
    timeout: Duration,
}

impl CacheHandle {
    /// The underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Run the liveness check again.
    pub async fn ping(&self) -> ConnectionResult<()> {
        within(self.timeout, ping(&self.pool)).await
    }

    /// Close the pool; checked-out connections are dropped on return.
    pub fn close(&self) {
        self.pool.close();
    }
}

impl fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.pool.status();
        f.debug_struct("CacheHandle")
            .field("max_size", &status.max_size)
            .field("size", &status.size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Resolve the Redis target from settings.
///
/// A non-empty `url` is authoritative and a parse failure is reported as
/// [`ConnectionError::InvalidCacheUrl`]. Otherwise the target is built from
/// host, port, password and database index.
pub fn cache_target(settings: &CacheSettings) -> ConnectionResult<ConnectionInfo> {
    if let Some(url) = settings.url() {
        return url
            .expose()
            .into_connection_info()
            .map_err(ConnectionError::InvalidCacheUrl);
    }

    let password = (!settings.password.is_blank()).then(|| settings.password.expose().to_owned());

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(settings.host.clone(), settings.port),
        redis: RedisConnectionInfo {
            db: settings.db,
            password,
            ..RedisConnectionInfo::default()
        },
    })
}

/// Connect to Redis and verify it with `PING`.
///
/// Checking out the first connection and the `PING` round trip are bounded
/// by `settings.connect_timeout()`.
pub async fn connect_cache(settings: &CacheSettings) -> ConnectionResult<CacheHandle> {
    let target = cache_target(settings)?;
    let timeout = settings.connect_timeout();

    info!(
        addr = %target.addr,
        db = target.redis.db,
        pool_size = settings.pool_size,
        "Connecting to Redis"
    );

    let mut pool_config = PoolConfig::new(settings.pool_size);
    pool_config.timeouts.wait = Some(timeout);
    pool_config.timeouts.create = Some(timeout);

    let mut config = Config::from_connection_info(target);
    config.pool = Some(pool_config);

    let pool = config.create_pool(Some(Runtime::Tokio1))?;

    within(timeout, ping(&pool)).await?;

    debug!("Redis liveness check passed");

    Ok(CacheHandle { pool, timeout })
}

async fn ping(pool: &Pool) -> ConnectionResult<()> {
    let mut conn = pool.get().await?;

    redis::cmd("PING")
        .query_async::<String>(&mut *conn)
        .await
        .map_err(ConnectionError::Cache)?;

    Ok(())
}

async fn within<T>(
    timeout: Duration,
    attempt: impl std::future::Future<Output = ConnectionResult<T>>,
) -> ConnectionResult<T> {
    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| ConnectionError::Timeout {
            backend: Backend::Cache,
            after: timeout,
        })?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;
    use whatomate_config::Secret;

    use super::*;

    fn discrete() -> CacheSettings {
        CacheSettings {
            host: "cache.local".to_owned(),
            port: 6380,
            password: Secret::new("pw"),
            db: 3,
            ..CacheSettings::default()
        }
    }

    #[test]
    fn discrete_fields_build_the_target() {
        let target = cache_target(&discrete()).unwrap();
        assert_eq!(
            target.addr,
            ConnectionAddr::Tcp("cache.local".to_owned(), 6380)
        );
        assert_eq!(target.redis.db, 3);
        assert_eq!(target.redis.password.as_deref(), Some("pw"));
    }

    #[test]
    fn blank_password_means_no_auth() {
        let settings = CacheSettings {
            password: Secret::default(),
            ..discrete()
        };
        let target = cache_target(&settings).unwrap();
        assert_eq!(target.redis.password, None);
    }

    #[test]
    fn url_wins_over_discrete_fields() {
        let settings = CacheSettings {
            url: Some(Secret::new("redis://:url-pw@primary:7000/5")),
            ..discrete()
        };
        let target = cache_target(&settings).unwrap();
        assert_eq!(target.addr, ConnectionAddr::Tcp("primary".to_owned(), 7000));
        assert_eq!(target.redis.db, 5);
        assert_eq!(target.redis.password.as_deref(), Some("url-pw"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn empty_url_falls_back_to_discrete_fields(#[case] url: &str) {
        let settings = CacheSettings {
            url: Some(Secret::new(url)),
            ..discrete()
        };
        let target = cache_target(&settings).unwrap();
        assert_eq!(
            target.addr,
            ConnectionAddr::Tcp("cache.local".to_owned(), 6380)
        );
    }

    #[rstest]
    #[case::not_a_url("not a url")]
    #[case::wrong_scheme("http://cache.local:6379")]
    fn invalid_url_is_an_invalid_target(#[case] url: &str) {
        let settings = CacheSettings {
            url: Some(Secret::new(url)),
            ..discrete()
        };
        let err = cache_target(&settings).unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidCacheUrl(_)));
        assert!(err.is_invalid_target());
        assert_eq!(err.backend(), Backend::Cache);
    }
}
