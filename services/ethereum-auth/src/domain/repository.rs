#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::domain::types::{NewNonce, Nonce};
use crate::error::NonceError;

/// Persistence port for nonces.
pub trait NonceRepository: Send + Sync {
    /// Persist a new nonce. Fails with [`NonceError::Collision`] when the
    /// value already exists.
    async fn insert(&self, nonce: &NewNonce) -> Result<Nonce, NonceError>;

    async fn find_by_value(&self, value: &str) -> Result<Option<Nonce>, NonceError>;

    /// Atomically flip `used` to true if the nonce is unused and
    /// `now < expires_at`. Returns `true` only for the caller whose write
    /// performed the flip.
    async fn mark_used_if_valid(&self, value: &str, now: DateTime<Utc>)
    -> Result<bool, NonceError>;

    /// Newest first by `created_at`.
    async fn list_recent(&self, limit: u64) -> Result<Vec<Nonce>, NonceError>;
}
