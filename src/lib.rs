//! Sensor bridge firmware library.
//!
//! Exposes the bridge core (codec, configuration assembler, persistent
//! store, sensor pipeline) for integration testing.  All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod assembler;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod link;
pub mod outputs;
pub mod protocol;
pub mod sensors;
pub mod store;
