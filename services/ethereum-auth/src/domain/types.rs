use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Length of generated nonce values.
pub const NONCE_LEN: usize = 32;
/// Storage limit for nonce values.
pub const NONCE_MAX_LEN: usize = 64;
/// Default nonce lifetime (5 minutes).
pub const DEFAULT_NONCE_TTL_SECS: i64 = 300;

/// Single-use challenge a client signs with its wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nonce {
    pub id: i64,
    pub value: String,
    #[serde(serialize_with = "tally_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "tally_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceStatus {
    Unused,
    Used,
    Expired,
}

impl Nonce {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> NonceStatus {
        if self.used {
            NonceStatus::Used
        } else if self.is_expired_at(now) {
            NonceStatus::Expired
        } else {
            NonceStatus::Unused
        }
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.used { "Used" } else { "Unused" };
        write!(f, "{} - {state}", self.value)
    }
}

/// Nonce about to be persisted; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewNonce {
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
