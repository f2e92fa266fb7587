//! Runtime orchestration for Cinder.
//!
//! This crate is the embedding layer: it loads configuration, sets up
//! logging, and assembles the dispatch pipeline from `cinder-framework`
//! behind a single [`Host`] handle. The platform connection itself stays
//! with the embedding program, which supplies the boundary traits from
//! `cinder-core` and feeds events into [`Host::handle_event`].

pub mod config;
pub mod error;
pub mod host;
pub mod logging;

pub use config::{HostConfig, LogFormat, LogLevel, LoggingConfig};
pub use error::{ConfigError, RuntimeError};
pub use host::{Host, HostBuilder};
