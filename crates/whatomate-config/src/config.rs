//! Unified configuration model.
//!
//! The same [`Config`] value is produced whether settings come from the
//! platform environment or from `config.toml`.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::secret::Secret;

/// Unified process configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Application flags.
    #[serde(default)]
    pub app: AppSettings,

    /// Listen settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// PostgreSQL settings.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Redis settings. Read from `[cache]` or `[redis]`.
    #[serde(default, alias = "redis")]
    pub cache: CacheSettings,
}

impl Config {
    /// Parse a TOML document.
    ///
    /// Missing sections and fields take their defaults; call
    /// [`Config::validate`] before using the result.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Figment::new()
            .merge(Toml::string(contents))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Check that every backend can be reached with these settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be non-zero"));
        }
        self.database.validate()?;
        self.cache.validate()
    }
}

/// Application flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppSettings {
    /// Application name, used in logs and as the PostgreSQL application name.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Platform environment name, when running on the platform.
    #[serde(default)]
    pub environment: Option<String>,

    /// Log SQL statements at info level.
    #[serde(default)]
    pub debug: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            environment: None,
            debug: false,
        }
    }
}

fn default_app_name() -> String {
    "whatomate".to_owned()
}

/// Listen settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_server_host")]
    pub host: IpAddr,

    /// Port to bind unless `PORT` overrides it.
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

const fn default_server_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

/// Default listen port.
pub const fn default_server_port() -> u16 {
    8080
}

/// PostgreSQL settings.
///
/// A non-empty `url` is authoritative; the discrete fields are only read
/// when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    /// Full connection string.
    #[serde(default)]
    pub url: Option<Secret>,

    /// Server host.
    #[serde(default)]
    pub host: String,

    /// Server port.
    #[serde(default = "default_database_port")]
    pub port: u16,

    /// Role to connect as.
    #[serde(default)]
    pub user: String,

    /// Role password.
    #[serde(default)]
    pub password: Secret,

    /// Database name.
    #[serde(default)]
    pub name: String,

    /// libpq-style SSL mode (`disable`, `prefer`, `require`, ...).
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Bound on connecting and on the liveness check, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl DatabaseSettings {
    /// The connection string, unless absent or empty.
    #[must_use]
    pub fn url(&self) -> Option<&Secret> {
        self.url.as_ref().filter(|url| !url.is_blank())
    }

    /// Connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.url().is_none() {
            require("database.host", &self.host)?;
            require("database.user", &self.user)?;
            require("database.name", &self.name)?;
            if self.port == 0 {
                return Err(ConfigError::invalid("database.port", "must be non-zero"));
            }
        }
        if self.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be non-zero",
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "database.connect_timeout_secs",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: String::new(),
            port: default_database_port(),
            user: String::new(),
            password: Secret::default(),
            name: String::new(),
            ssl_mode: default_ssl_mode(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Default PostgreSQL port.
pub const fn default_database_port() -> u16 {
    5432
}

fn default_ssl_mode() -> String {
    "prefer".to_owned()
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

/// Redis settings.
///
/// A non-empty `url` is authoritative; the discrete fields are only read
/// when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheSettings {
    /// Full connection string.
    #[serde(default)]
    pub url: Option<Secret>,

    /// Server host.
    #[serde(default)]
    pub host: String,

    /// Server port.
    #[serde(default = "default_cache_port")]
    pub port: u16,

    /// `AUTH` password; empty means none.
    #[serde(default)]
    pub password: Secret,

    /// Logical database index.
    #[serde(default)]
    pub db: i64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Bound on connecting and on the liveness check, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl CacheSettings {
    /// The connection string, unless absent or empty.
    #[must_use]
    pub fn url(&self) -> Option<&Secret> {
        self.url.as_ref().filter(|url| !url.is_blank())
    }

    /// Connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.url().is_none() {
            require("cache.host", &self.host)?;
            if self.port == 0 {
                return Err(ConfigError::invalid("cache.port", "must be non-zero"));
            }
            if self.db < 0 {
                return Err(ConfigError::invalid("cache.db", "must not be negative"));
            }
        }
        if self.pool_size == 0 {
            return Err(ConfigError::invalid("cache.pool_size", "must be non-zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "cache.connect_timeout_secs",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: String::new(),
            port: default_cache_port(),
            password: Secret::default(),
            db: 0,
            pool_size: default_pool_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Default Redis port.
pub const fn default_cache_port() -> u16 {
    6379
}

const fn default_pool_size() -> usize {
    10
}

fn require(key: &'static str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField(key))
    } else {
        Ok(())
    }
}
