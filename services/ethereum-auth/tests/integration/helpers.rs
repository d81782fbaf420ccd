use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use tally_ethereum_auth::domain::repository::NonceRepository;
use tally_ethereum_auth::domain::types::{NewNonce, Nonce};
use tally_ethereum_auth::error::NonceError;

// ── MockNonceRepo ────────────────────────────────────────────────────────────

pub struct MockNonceRepo {
    pub nonces: Arc<Mutex<Vec<Nonce>>>,
}

impl MockNonceRepo {
    pub fn new(nonces: Vec<Nonce>) -> Self {
        Self {
            nonces: Arc::new(Mutex::new(nonces)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns a shared handle to the stored nonces for post-execution inspection.
    pub fn nonces_handle(&self) -> Arc<Mutex<Vec<Nonce>>> {
        Arc::clone(&self.nonces)
    }
}

impl NonceRepository for MockNonceRepo {
    async fn insert(&self, nonce: &NewNonce) -> Result<Nonce, NonceError> {
        let mut nonces = self.nonces.lock().unwrap();
        if nonces.iter().any(|n| n.value == nonce.value) {
            return Err(NonceError::Collision);
        }
        let stored = Nonce {
            id: nonces.len() as i64 + 1,
            value: nonce.value.clone(),
            created_at: nonce.created_at,
            expires_at: nonce.expires_at,
            used: false,
        };
        nonces.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<Nonce>, NonceError> {
        Ok(self
            .nonces
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.value == value)
            .cloned())
    }

    async fn mark_used_if_valid(
        &self,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, NonceError> {
        let mut nonces = self.nonces.lock().unwrap();
        match nonces
            .iter_mut()
            .find(|n| n.value == value && !n.used && n.expires_at > now)
        {
            Some(n) => {
                n.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<Nonce>, NonceError> {
        let mut all = self.nonces.lock().unwrap().clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        all.truncate(limit as usize);
        Ok(all)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Stored nonce created `age` ago with the given lifetime.
pub fn stored_nonce(id: i64, value: &str, age: Duration, ttl: Duration, used: bool) -> Nonce {
    let created_at = Utc::now() - age;
    Nonce {
        id,
        value: value.to_owned(),
        created_at,
        expires_at: created_at + ttl,
        used,
    }
}
