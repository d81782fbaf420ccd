//! Test utilities for Tally crates.
//!
//! Provides throwaway SQLite databases with optional migrations applied.
//! Import from `[dev-dependencies]` only, never in production code.

pub mod db;

pub use db::TestDb;
