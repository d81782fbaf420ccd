use sea_orm::DatabaseConnection;
use tally_core::config::DatabaseConfig;
use tally_ledger::{Ledger, Migration};
use tempfile::NamedTempFile;

/// Temporary SQLite database, deleted when dropped.
pub struct TestDb {
    connection: DatabaseConnection,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create an empty database.
    ///
    /// Panics if the temporary file or the connection cannot be created.
    pub async fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("failed to create temp file");
        let db_path = temp_file.path().to_str().expect("invalid temp file path");
        let config = DatabaseConfig {
            database_url: format!("sqlite://{db_path}?mode=rwc"),
            database_max_connections: 4,
        };
        let connection = tally_core::db::connect(&config)
            .await
            .expect("failed to connect to test database");

        Self {
            connection,
            _temp_file: temp_file,
        }
    }

    /// Create a database with every migration of `catalog` applied.
    pub async fn migrated(catalog: Vec<Migration>) -> Self {
        let db = Self::new().await;
        db.ledger(catalog)
            .migrate()
            .await
            .expect("failed to apply migrations");
        db
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Ledger over this database and `catalog`.
    pub fn ledger(&self, catalog: Vec<Migration>) -> Ledger {
        Ledger::new(self.connection.clone(), catalog)
    }
}
