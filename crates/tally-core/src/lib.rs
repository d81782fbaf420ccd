//! Shared plumbing for Tally binaries and services: configuration, tracing,
//! database connection setup and serialization helpers.

pub mod config;
pub mod db;
pub mod serde;
pub mod tracing;
