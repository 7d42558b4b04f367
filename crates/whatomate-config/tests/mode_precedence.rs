//! Detection and resolution together: the detected mode picks the source.

use std::fs;

use whatomate_config::env::vars;
use whatomate_config::{ConfigResolver, DeploymentMode, MapEnv};

const FILE: &str = r#"
[server]
port = 3000

[database]
host = "file-db"
user = "whatomate"
name = "whatomate"

[redis]
host = "file-cache"
"#;

#[test]
fn platform_signal_overrides_a_present_file() {
    let dir = tempfile::tempdir().expect("failed to create temp directory");
    let path = dir.path().join("config.toml");
    fs::write(&path, FILE).expect("failed to write config");

    let env = MapEnv::new()
        .with(vars::DATABASE_URL, "postgres://env-db/app")
        .with(vars::REDIS_URL, "redis://env-cache:6379");

    let mode = DeploymentMode::detect(&env);
    let config = ConfigResolver::new(&env, &path)
        .resolve(mode)
        .expect("platform config should resolve");

    assert_eq!(mode, DeploymentMode::PlatformManaged);
    assert!(config.database.host.is_empty());
    assert_eq!(config.server.port, 8080);
    assert_eq!(
        config.cache.url().map(|url| url.expose()),
        Some("redis://env-cache:6379")
    );
}

#[test]
fn empty_signals_use_the_file_with_the_redis_url_on_top() {
    let dir = tempfile::tempdir().expect("failed to create temp directory");
    let path = dir.path().join("config.toml");
    fs::write(&path, FILE).expect("failed to write config");

    let env = MapEnv::new()
        .with(vars::RAILWAY_ENVIRONMENT, "")
        .with(vars::DATABASE_URL, "")
        .with(vars::REDIS_URL, "redis://env-cache:6379");

    let mode = DeploymentMode::detect(&env);
    let config = ConfigResolver::new(&env, &path)
        .resolve(mode)
        .expect("file config should resolve");

    assert_eq!(mode, DeploymentMode::LocalFile);
    assert_eq!(config.database.host, "file-db");
    assert_eq!(config.server.port, 3000);
    assert_eq!(
        config.cache.url().map(|url| url.expose()),
        Some("redis://env-cache:6379")
    );
}
