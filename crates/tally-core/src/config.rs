/// Trait for loading service configuration from environment variables.
///
/// Implementors should derive `serde::Deserialize` and then call
/// `Config::from_env()` to load configuration at startup. Field names map to
/// upper-cased env vars (`database_url` ← `DATABASE_URL`).
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

/// Connection settings shared by every binary that touches the database.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://…` in production, `sqlite://…` in tests).
    pub database_url: String,
    /// Upper bound for pooled connections. Env var: `DATABASE_MAX_CONNECTIONS`.
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
}

impl Config for DatabaseConfig {}

fn default_max_connections() -> u32 {
    10
}
