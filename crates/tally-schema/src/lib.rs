//! Persisted record layout for Tally entities.
//!
//! Column names and types here are the storage contract; they must match the
//! shape produced by the migration catalog in `tally-migration`.

pub mod contribution_types;
pub mod nonces;
pub mod timestamps;
pub mod users;
pub mod validator_wallets;

pub use timestamps::Timestamped;
