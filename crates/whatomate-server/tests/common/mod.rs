//! Common test utilities for bootstrap integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use whatomate_backend::{Backend, ConnectionError, ConnectionResult, Connector};
use whatomate_config::{CacheSettings, DatabaseSettings};

/// A connection attempt seen by [`RecordingConnector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Store connection with the URL (if any) and debug flag it was given.
    Store { url: Option<String>, debug: bool },
    /// Cache connection with the URL (if any) it was given.
    Cache { url: Option<String> },
}

/// Handle returned by [`RecordingConnector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeHandle(pub Backend);

/// Connector that records attempts and fails on demand.
#[derive(Debug, Default)]
pub struct RecordingConnector {
    fail_store: bool,
    fail_cache: bool,
    attempts: Mutex<Vec<Attempt>>,
}

impl RecordingConnector {
    /// Both backends connect.
    pub fn healthy() -> Self {
        Self::default()
    }

    /// The store connection fails.
    pub fn failing_store() -> Self {
        Self {
            fail_store: true,
            ..Self::default()
        }
    }

    /// The cache connection fails.
    pub fn failing_cache() -> Self {
        Self {
            fail_cache: true,
            ..Self::default()
        }
    }

    /// Attempts made so far, in order.
    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    fn record(&self, attempt: Attempt) {
        self.attempts.lock().unwrap().push(attempt);
    }
}

fn unreachable(backend: Backend) -> ConnectionError {
    ConnectionError::Timeout {
        backend,
        after: Duration::from_secs(5),
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    type Store = FakeHandle;
    type Cache = FakeHandle;

    async fn connect_store(
        &self,
        settings: &DatabaseSettings,
        debug: bool,
    ) -> ConnectionResult<FakeHandle> {
        self.record(Attempt::Store {
            url: settings.url().map(|url| url.expose().to_owned()),
            debug,
        });
        if self.fail_store {
            return Err(unreachable(Backend::Database));
        }
        Ok(FakeHandle(Backend::Database))
    }

    async fn connect_cache(&self, settings: &CacheSettings) -> ConnectionResult<FakeHandle> {
        self.record(Attempt::Cache {
            url: settings.url().map(|url| url.expose().to_owned()),
        });
        if self.fail_cache {
            return Err(unreachable(Backend::Cache));
        }
        Ok(FakeHandle(Backend::Cache))
    }
}

/// A local configuration file listening on 3000.
pub const LOCAL_CONFIG: &str = r#"
[app]
debug = true

[server]
port = 3000

[database]
host = "localhost"
user = "whatomate"
password = "secret"
name = "whatomate"
ssl_mode = "disable"

[redis]
host = "localhost"
port = 6379
"#;

/// Write `contents` to `config.toml` in a fresh directory.
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp directory");
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("failed to write config");
    (dir, path)
}
