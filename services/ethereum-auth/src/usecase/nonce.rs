use anyhow::anyhow;
use chrono::{Duration, Utc};
use rand::RngExt;
use tracing::{debug, info};

use crate::domain::repository::NonceRepository;
use crate::domain::types::{NONCE_LEN, NONCE_MAX_LEN, NewNonce, Nonce};
use crate::error::NonceError;

/// Charset for generating nonce values (alphanumeric, both cases).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn generate_value() -> String {
    let mut rng = rand::rng();
    (0..NONCE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Issues and consumes single-use nonces.
pub struct NonceStore<R>
where
    R: NonceRepository,
{
    pub nonces: R,
}

impl<R> NonceStore<R>
where
    R: NonceRepository,
{
    /// Issue a fresh nonce valid for `ttl`. A zero or negative `ttl` yields a
    /// nonce that is already expired.
    pub async fn issue(&self, ttl: Duration) -> Result<Nonce, NonceError> {
        let now = Utc::now();
        let new = NewNonce {
            value: generate_value(),
            created_at: now,
            expires_at: now + ttl,
        };
        let nonce = self.nonces.insert(&new).await?;
        info!(id = nonce.id, expires_at = %nonce.expires_at, "nonce issued");
        Ok(nonce)
    }

    /// Consume `value` exactly once.
    ///
    /// The flip is a single conditional write; when it does not happen the
    /// row is re-read to report why. Expiry wins over `used`.
    pub async fn consume(&self, value: &str) -> Result<Nonce, NonceError> {
        if value.len() > NONCE_MAX_LEN {
            return Err(NonceError::NotFound);
        }
        let now = Utc::now();
        if self.nonces.mark_used_if_valid(value, now).await? {
            let nonce = self
                .nonces
                .find_by_value(value)
                .await?
                .ok_or_else(|| anyhow!("consumed nonce disappeared"))?;
            info!(id = nonce.id, "nonce consumed");
            return Ok(nonce);
        }

        let nonce = self
            .nonces
            .find_by_value(value)
            .await?
            .ok_or(NonceError::NotFound)?;
        let err = if nonce.is_expired_at(now) {
            NonceError::Expired
        } else if nonce.used {
            NonceError::AlreadyUsed
        } else {
            return Err(anyhow!("nonce {} left unconsumed while valid", nonce.id).into());
        };
        debug!(id = nonce.id, kind = err.kind(), "nonce rejected");
        Err(err)
    }

    /// Read-only lookup. Values longer than storage permits cannot exist.
    pub async fn inspect(&self, value: &str) -> Result<Option<Nonce>, NonceError> {
        if value.len() > NONCE_MAX_LEN {
            return Ok(None);
        }
        self.nonces.find_by_value(value).await
    }

    /// Newest-first listing.
    pub async fn list(&self, limit: u64) -> Result<Vec<Nonce>, NonceError> {
        self.nonces.list_recent(limit).await
    }
}
