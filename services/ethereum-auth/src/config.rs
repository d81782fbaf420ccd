use chrono::Duration;
use tally_core::config::Config;

use crate::domain::types::DEFAULT_NONCE_TTL_SECS;

/// Nonce store settings loaded from environment variables.
///
/// The database connection is configured separately through
/// [`tally_core::config::DatabaseConfig`].
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NonceConfig {
    /// Lifetime of issued nonces in seconds (default 300). Env var: `NONCE_TTL_SECS`.
    #[serde(default = "default_nonce_ttl_secs")]
    pub nonce_ttl_secs: i64,
}

impl Config for NonceConfig {}

impl NonceConfig {
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.nonce_ttl_secs)
    }
}

fn default_nonce_ttl_secs() -> i64 {
    DEFAULT_NONCE_TTL_SECS
}
