//! Startup pipeline.
//!
//! detect mode → resolve config → connect store → connect cache → port.
//! The first failing stage ends the pipeline; later stages never run.

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::info;
use whatomate_backend::{ConnectionError, Connector};
use whatomate_config::env::vars;
use whatomate_config::{
    Config, ConfigError, ConfigResolver, ConfigResult, DeploymentMode, EnvSource,
};

/// A step of the startup pipeline that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resolving and validating configuration.
    LoadConfig,
    /// Connecting to PostgreSQL.
    ConnectDatabase,
    /// Connecting to Redis.
    ConnectCache,
}

impl Stage {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadConfig => "load-config",
            Self::ConnectDatabase => "connect-database",
            Self::ConnectCache => "connect-cache",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why startup stopped.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration could not be resolved.
    #[error("failed to load config: {0}")]
    Config(#[source] ConfigError),

    /// PostgreSQL could not be reached or verified.
    #[error("failed to connect to database: {0}")]
    Database(#[source] ConnectionError),

    /// Redis could not be reached or verified.
    #[error("failed to connect to redis: {0}")]
    Cache(#[source] ConnectionError),
}

impl BootstrapError {
    /// The stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::LoadConfig,
            Self::Database(_) => Stage::ConnectDatabase,
            Self::Cache(_) => Stage::ConnectCache,
        }
    }
}

/// Everything the serving layer needs once startup succeeded.
#[derive(Debug)]
pub struct Ready<S, C> {
    /// Detected deployment mode.
    pub mode: DeploymentMode,
    /// Resolved configuration.
    pub config: Config,
    /// Verified store handle.
    pub store: S,
    /// Verified cache handle.
    pub cache: C,
    /// Port to listen on.
    pub port: String,
}

/// Run the startup pipeline once.
///
/// `config_path` is only read when no platform signal is present.
pub async fn bootstrap<E, C>(
    env: &E,
    config_path: &Path,
    connector: &C,
) -> Result<Ready<C::Store, C::Cache>, BootstrapError>
where
    E: EnvSource,
    C: Connector,
{
    let mode = DeploymentMode::detect(env);
    info!(mode = %mode, "Deployment mode detected");

    let config = ConfigResolver::new(env, config_path)
        .resolve(mode)
        .map_err(BootstrapError::Config)?;

    info!(
        app = %config.app.name,
        environment = config.app.environment.as_deref().unwrap_or("local"),
        debug = config.app.debug,
        "Configuration loaded"
    );

    let port = effective_port(env, &config).map_err(BootstrapError::Config)?;

    let store = connector
        .connect_store(&config.database, config.app.debug)
        .await
        .map_err(BootstrapError::Database)?;
    info!("Database connected");

    let cache = connector
        .connect_cache(&config.cache)
        .await
        .map_err(BootstrapError::Cache)?;
    info!("Redis connected");

    Ok(Ready {
        mode,
        config,
        store,
        cache,
        port,
    })
}

/// The port to listen on.
///
/// A non-empty `PORT` wins, trimmed; otherwise the configured port. `PORT`
/// must name a non-zero TCP port in every deployment mode. It is checked
/// together with the configuration, before any backend is contacted.
pub fn effective_port(env: &impl EnvSource, config: &Config) -> ConfigResult<String> {
    let Some(raw) = env.non_empty(vars::PORT) else {
        return Ok(config.server.port.to_string());
    };

    let port = raw.trim();
    match port.parse::<u16>() {
        Ok(0) => Err(ConfigError::invalid(vars::PORT, "must be non-zero")),
        Ok(_) => Ok(port.to_owned()),
        Err(e) => Err(ConfigError::invalid(vars::PORT, e.to_string())),
    }
}
