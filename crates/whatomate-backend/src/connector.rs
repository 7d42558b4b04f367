//! The seam between startup orchestration and the backend clients.

use async_trait::async_trait;
use whatomate_config::{CacheSettings, DatabaseSettings};

use crate::cache::{connect_cache, CacheHandle};
use crate::error::ConnectionResult;
use crate::store::{connect_store, StoreHandle};

/// Establishes verified connections to the store and the cache.
///
/// Implementations must only return a handle once its backend has answered
/// a liveness check.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Handle returned for the relational store.
    type Store: Send;

    /// Handle returned for the cache.
    type Cache: Send;

    /// Connect to the relational store.
    async fn connect_store(
        &self,
        settings: &DatabaseSettings,
        debug: bool,
    ) -> ConnectionResult<Self::Store>;

    /// Connect to the cache.
    async fn connect_cache(&self, settings: &CacheSettings) -> ConnectionResult<Self::Cache>;
}

/// Connects to real PostgreSQL and Redis servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveConnector;

#[async_trait]
impl Connector for LiveConnector {
    type Store = StoreHandle;
    type Cache = CacheHandle;

    async fn connect_store(
        &self,
        settings: &DatabaseSettings,
        debug: bool,
    ) -> ConnectionResult<StoreHandle> {
        connect_store(settings, debug).await
    }

    async fn connect_cache(&self, settings: &CacheSettings) -> ConnectionResult<CacheHandle> {
        connect_cache(settings).await
    }
}
