//! Command-line driver for the nonce store.
//!
//! ```bash
//! DATABASE_URL=postgres://… ethereum-auth issue
//! DATABASE_URL=postgres://… ethereum-auth consume <VALUE>
//! ```

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;

use tally_core::config::{Config, DatabaseConfig};
use tally_ethereum_auth::config::NonceConfig;
use tally_ethereum_auth::error::NonceError;
use tally_ethereum_auth::infra::db::DbNonceRepository;
use tally_ethereum_auth::usecase::nonce::NonceStore;

#[derive(Parser)]
#[command(about = "Issue and consume single-use sign-in nonces")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue a fresh nonce
    Issue {
        /// Lifetime in seconds; defaults to NONCE_TTL_SECS
        #[arg(long, allow_negative_numbers = true)]
        ttl_secs: Option<i64>,
    },
    /// Consume a nonce exactly once
    Consume { value: String },
    /// Show a nonce without consuming it
    Inspect { value: String },
    /// List the most recent nonces
    List {
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tally_core::tracing::init_tracing();
    let args = Args::parse();

    let db_config = DatabaseConfig::from_env().context("load database config")?;
    let nonce_config = NonceConfig::from_env().context("load nonce config")?;
    let db = tally_core::db::connect(&db_config)
        .await
        .context("connect to database")?;
    let store = NonceStore {
        nonces: DbNonceRepository { db },
    };

    let result = match args.command {
        Command::Issue { ttl_secs } => {
            let ttl = ttl_secs.map_or_else(|| nonce_config.ttl(), Duration::seconds);
            store.issue(ttl).await.map(|n| json!(n))
        }
        Command::Consume { value } => store.consume(&value).await.map(|n| json!(n)),
        Command::Inspect { value } => store.inspect(&value).await.map(|found| {
            let now = Utc::now();
            match found {
                Some(n) => json!({ "status": n.status_at(now), "nonce": n }),
                None => serde_json::Value::Null,
            }
        }),
        Command::List { limit } => store.list(limit).await.map(|all| json!(all)),
    };

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(NonceError::Internal(e)) => Err(e),
        Err(e) => {
            println!(
                "{}",
                json!({ "kind": e.kind(), "message": e.to_string() })
            );
            std::process::exit(1);
        }
    }
}
