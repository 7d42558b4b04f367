//! PostgreSQL connector.

use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::{debug, info};
use whatomate_config::DatabaseSettings;

use crate::error::{Backend, ConnectionError, ConnectionResult};

/// A PostgreSQL pool that answered a liveness check when it was created.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    pool: PgPool,
    timeout: Duration,
}

impl StoreHandle {
    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the liveness check again.
    pub async fn ping(&self) -> ConnectionResult<()> {
        within(self.timeout, liveness(&self.pool)).await
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Build connection options from settings.
///
/// A non-empty `url` is parsed and used as-is. Otherwise the options are
/// built from the discrete host, port, user, password, name and SSL mode.
/// Statement logging is only enabled when `debug` is set.
pub fn store_options(
    settings: &DatabaseSettings,
    debug: bool,
) -> ConnectionResult<PgConnectOptions> {
    let options = match settings.url() {
        Some(url) => PgConnectOptions::from_str(url.expose())
            .map_err(ConnectionError::InvalidDatabaseTarget)?,
        None => {
            let ssl_mode = PgSslMode::from_str(&settings.ssl_mode)
                .map_err(ConnectionError::InvalidDatabaseTarget)?;
            let options = PgConnectOptions::new()
                .host(&settings.host)
                .port(settings.port)
                .username(&settings.user)
                .database(&settings.name)
                .ssl_mode(ssl_mode);
            if settings.password.is_blank() {
                options
            } else {
                options.password(settings.password.expose())
            }
        }
    };

    Ok(if debug {
        options.log_statements(LevelFilter::Info)
    } else {
        options.disable_statement_logging()
    })
}

/// Connect to PostgreSQL and verify it with `SELECT 1`.
///
/// Both the first connection and the liveness check are bounded by
/// `settings.connect_timeout()`.
pub async fn connect_store(
    settings: &DatabaseSettings,
    debug: bool,
) -> ConnectionResult<StoreHandle> {
    let options = store_options(settings, debug)?;
    let timeout = settings.connect_timeout();

    info!(
        host = %options.get_host(),
        port = options.get_port(),
        database = options.get_database().unwrap_or_default(),
        max_connections = settings.max_connections,
        "Connecting to PostgreSQL"
    );

    let pool = within(timeout, async {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await?;
        liveness(&pool).await?;
        Ok::<_, ConnectionError>(pool)
    })
    .await?;

    debug!("PostgreSQL liveness check passed");

    Ok(StoreHandle { pool, timeout })
}

async fn liveness(pool: &PgPool) -> ConnectionResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

async fn within<T>(
    timeout: Duration,
    attempt: impl std::future::Future<Output = ConnectionResult<T>>,
) -> ConnectionResult<T> {
    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| ConnectionError::Timeout {
            backend: Backend::Database,
            after: timeout,
        })?
}
