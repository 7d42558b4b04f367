//! Whatomate configuration.
//!
//! Decides where the process takes its settings from and produces one
//! validated [`Config`] value.
//!
//! # Deployment modes
//!
//! The mode is detected once from the environment:
//!
//! - **Platform managed** when `RAILWAY_ENVIRONMENT` or `DATABASE_URL` is set.
//!   Every setting is read from environment variables.
//! - **Local file** otherwise. Settings are read from `config.toml`, except
//!   that a non-empty `REDIS_URL` still replaces the cache URL.
//!
//! ```toml
//! [app]
//! debug = false
//!
//! [server]
//! port = 3000
//!
//! [database]
//! host = "localhost"
//! user = "whatomate"
//! password = "secret"
//! name = "whatomate"
//!
//! [redis]
//! host = "localhost"
//! port = 6379
//! ```
//!
//! # Example
//!
//! ```no_run
//! use whatomate_config::{ConfigResolver, DeploymentMode, ProcessEnv, DEFAULT_CONFIG_PATH};
//!
//! let env = ProcessEnv;
//! let mode = DeploymentMode::detect(&env);
//! let config = ConfigResolver::new(&env, DEFAULT_CONFIG_PATH).resolve(mode)?;
//! println!("listening on {}", config.server.port);
//! # Ok::<(), whatomate_config::ConfigError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod env;
pub mod error;
pub mod mode;
pub mod resolver;
pub mod secret;

pub use config::{AppSettings, CacheSettings, Config, DatabaseSettings, ServerSettings};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::{ConfigError, ConfigResult};
pub use mode::DeploymentMode;
pub use resolver::{ConfigResolver, DEFAULT_CONFIG_PATH};
pub use secret::Secret;
