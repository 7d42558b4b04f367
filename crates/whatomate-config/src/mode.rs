//! Deployment mode detection.

use std::fmt;

use crate::env::{vars, EnvSource};

/// Where the process takes its configuration from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentMode {
    /// Running on the hosting platform; configuration comes from the
    /// environment.
    PlatformManaged,

    /// Running locally; configuration comes from a TOML file.
    LocalFile,
}

impl DeploymentMode {
    /// Classify the deployment from environment signals.
    ///
    /// `PlatformManaged` when either `RAILWAY_ENVIRONMENT` or `DATABASE_URL`
    /// holds a non-empty value, `LocalFile` otherwise.
    pub fn detect(env: &impl EnvSource) -> Self {
        let signalled = [vars::RAILWAY_ENVIRONMENT, vars::DATABASE_URL]
            .into_iter()
            .any(|key| env.non_empty(key).is_some());

        if signalled {
            Self::PlatformManaged
        } else {
            Self::LocalFile
        }
    }

    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlatformManaged => "platform-managed",
            Self::LocalFile => "local-file",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
