//! Whatomate server.
//!
//! Startup for the Whatomate server process. Before any request handling
//! exists the process must:
//!
//! 1. detect whether it runs on the hosting platform or locally;
//! 2. resolve its configuration from the environment or `config.toml`;
//! 3. connect to PostgreSQL and verify the connection;
//! 4. connect to Redis and verify the connection;
//! 5. work out the port to listen on (`PORT` overrides the configured port).
//!
//! [`bootstrap`] runs these steps in order and returns a [`Ready`] value or
//! the [`BootstrapError`] of the first stage that failed. The binary turns
//! that error into a non-zero exit status.

#![forbid(unsafe_code)]

pub mod bootstrap;

pub use bootstrap::{bootstrap, effective_port, BootstrapError, Ready, Stage};
