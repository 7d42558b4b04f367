//! Configuration resolution.
//!
//! On the platform every setting comes from the environment. Locally the
//! settings come from a TOML file, with `REDIS_URL` taking precedence over
//! the file's cache section in both cases. Either way the result is validated
//! before it is returned.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::config::{
    default_cache_port, default_database_port, default_server_port, AppSettings, CacheSettings,
    Config, DatabaseSettings, ServerSettings,
};
use crate::env::{vars, EnvSource};
use crate::error::{ConfigError, ConfigResult};
use crate::mode::DeploymentMode;
use crate::secret::Secret;

/// Conventional configuration file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Redis host used on the platform when neither `REDIS_URL` nor `REDISHOST`
/// is set.
const PLATFORM_CACHE_HOST: &str = "localhost";

/// Produces a [`Config`] for a [`DeploymentMode`].
#[derive(Debug)]
pub struct ConfigResolver<'a, E> {
    env: &'a E,
    path: PathBuf,
}

impl<'a, E: EnvSource> ConfigResolver<'a, E> {
    /// Create a resolver reading `env` and, in local mode, the file at `path`.
    pub fn new(env: &'a E, path: impl Into<PathBuf>) -> Self {
        Self {
            env,
            path: path.into(),
        }
    }

    /// The configuration file consulted in local mode.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve and validate the configuration.
    pub fn resolve(&self, mode: DeploymentMode) -> ConfigResult<Config> {
        let config = match mode {
            DeploymentMode::PlatformManaged => self.load_env()?,
            DeploymentMode::LocalFile => self.load_file()?,
        };
        config.validate()?;
        Ok(config)
    }

    fn load_file(&self) -> ConfigResult<Config> {
        debug!(path = %self.path.display(), "Reading configuration file");

        let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut config = Config::from_toml(&contents)?;
        if let Some(url) = self.env.non_empty(vars::REDIS_URL) {
            debug!("REDIS_URL overrides the file's cache settings");
            config.cache.url = Some(Secret::new(url));
        }
        Ok(config)
    }

    fn load_env(&self) -> ConfigResult<Config> {
        debug!("Reading configuration from environment");

        Ok(Config {
            app: AppSettings {
                environment: self.env.non_empty(vars::RAILWAY_ENVIRONMENT),
                debug: self.flag(vars::DEBUG)?,
                ..AppSettings::default()
            },
            server: ServerSettings {
                port: self.parsed(vars::PORT, default_server_port())?,
                ..ServerSettings::default()
            },
            database: self.database_from_env()?,
            cache: self.cache_from_env()?,
        })
    }

    fn database_from_env(&self) -> ConfigResult<DatabaseSettings> {
        if let Some(url) = self.env.non_empty(vars::DATABASE_URL) {
            return Ok(DatabaseSettings {
                url: Some(Secret::new(url)),
                ..DatabaseSettings::default()
            });
        }

        Ok(DatabaseSettings {
            host: self.text(vars::PGHOST),
            port: self.parsed(vars::PGPORT, default_database_port())?,
            user: self.text(vars::PGUSER),
            password: self.secret(vars::PGPASSWORD),
            name: self.text(vars::PGDATABASE),
            ..DatabaseSettings::default()
        })
    }

    fn cache_from_env(&self) -> ConfigResult<CacheSettings> {
        if let Some(url) = self.env.non_empty(vars::REDIS_URL) {
            return Ok(CacheSettings {
                url: Some(Secret::new(url)),
                ..CacheSettings::default()
            });
        }

        Ok(CacheSettings {
            host: self
                .env
                .non_empty(vars::REDISHOST)
                .unwrap_or_else(|| PLATFORM_CACHE_HOST.to_owned()),
            port: self.parsed(vars::REDISPORT, default_cache_port())?,
            password: self.secret(vars::REDISPASSWORD),
            ..CacheSettings::default()
        })
    }

    fn text(&self, key: &str) -> String {
        self.env.non_empty(key).unwrap_or_default()
    }

    fn secret(&self, key: &str) -> Secret {
        self.env.var(key).map(Secret::new).unwrap_or_default()
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.env.non_empty(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &'static str) -> ConfigResult<bool> {
        match self.env.non_empty(key) {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::invalid(key, format!("expected a boolean, got {raw:?}"))),
            None => Ok(false),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
