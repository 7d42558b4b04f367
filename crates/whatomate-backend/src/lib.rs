//! Whatomate backend connections.
//!
//! Turns resolved settings into live, verified handles for PostgreSQL and
//! Redis. A handle is never returned before its backend has answered a
//! liveness check (`SELECT 1` for PostgreSQL, `PING` for Redis), and every
//! attempt is bounded by the configured connect timeout.
//!
//! Both connectors share the same precedence rule: a non-empty connection
//! URL is authoritative, otherwise the discrete host/port/credential fields
//! are used. An unparseable URL is reported separately from an unreachable
//! backend; see [`ConnectionError::is_invalid_target`].

#![forbid(unsafe_code)]

pub mod cache;
pub mod connector;
pub mod error;
pub mod store;

pub use cache::{cache_target, connect_cache, CacheHandle};
pub use connector::{Connector, LiveConnector};
pub use error::{Backend, ConnectionError, ConnectionResult};
pub use store::{connect_store, store_options, StoreHandle};
