//! Persistent storage for the driver.
//!
//! Configuration is a single TOML file; see [`config`] for its schema and the
//! platform path it is read from.

pub mod config;
