//! Environment lookup.
//!
//! Every environment read in this crate goes through [`EnvSource`] so that
//! detection and resolution can run against an in-memory map in tests.

use std::collections::HashMap;

/// Names of the environment variables consulted during startup.
pub mod vars {
    /// Set by the hosting platform on every deployment.
    pub const RAILWAY_ENVIRONMENT: &str = "RAILWAY_ENVIRONMENT";
    /// PostgreSQL connection string.
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Redis connection string.
    pub const REDIS_URL: &str = "REDIS_URL";
    /// Listen port override.
    pub const PORT: &str = "PORT";
    /// Enables verbose store diagnostics.
    pub const DEBUG: &str = "DEBUG";

    /// Discrete PostgreSQL host.
    pub const PGHOST: &str = "PGHOST";
    /// Discrete PostgreSQL port.
    pub const PGPORT: &str = "PGPORT";
    /// Discrete PostgreSQL user.
    pub const PGUSER: &str = "PGUSER";
    /// Discrete PostgreSQL password.
    pub const PGPASSWORD: &str = "PGPASSWORD";
    /// Discrete PostgreSQL database name.
    pub const PGDATABASE: &str = "PGDATABASE";

    /// Discrete Redis host.
    pub const REDISHOST: &str = "REDISHOST";
    /// Discrete Redis port.
    pub const REDISPORT: &str = "REDISPORT";
    /// Discrete Redis password.
    pub const REDISPASSWORD: &str = "REDISPASSWORD";
}

/// Read-only access to environment variables.
pub trait EnvSource {
    /// Returns the raw value of `key`, if set and valid UTF-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the value of `key` unless it is absent, empty or whitespace.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.trim().is_empty())
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Remove a variable.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_skips_blank_values() {
        let env: MapEnv = [("EMPTY", ""), ("BLANK", "   "), ("SET", "x")]
            .into_iter()
            .collect();

        assert_eq!(env.non_empty("EMPTY"), None);
        assert_eq!(env.non_empty("BLANK"), None);
        assert_eq!(env.non_empty("MISSING"), None);
        assert_eq!(env.non_empty("SET").as_deref(), Some("x"));
    }

    #[test]
    fn var_returns_raw_value() {
        let env = MapEnv::new().with("PASSWORD", " padded ");
        assert_eq!(env.var("PASSWORD").as_deref(), Some(" padded "));
    }

    #[test]
    fn remove_unsets_variable() {
        let mut env = MapEnv::new().with("PORT", "8080");
        assert_eq!(env.remove("PORT").as_deref(), Some("8080"));
        assert_eq!(env.var("PORT"), None);
    }

    #[test]
    fn references_forward_lookups() {
        fn port(env: impl EnvSource) -> Option<String> {
            env.non_empty("PORT")
        }

        let env = MapEnv::new().with("PORT", "8080");
        assert_eq!(port(&env).as_deref(), Some("8080"));
    }
}
