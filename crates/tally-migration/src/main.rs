//! Operator entry point for the schema ledger.
//!
//! ```bash
//! DATABASE_URL=postgres://… tally-migrate status
//! DATABASE_URL=postgres://… tally-migrate up
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use tally_core::config::{Config, DatabaseConfig};
use tally_ledger::Ledger;

#[derive(Parser)]
#[command(about = "Apply and inspect schema migrations")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Every migration with its applied-at time
    Status,
    /// Pending migrations in apply order
    Plan,
    /// Apply every pending migration
    Up,
    /// Clear a lock left behind by a crashed run
    Unlock,
}

#[tokio::main]
async fn main() -> Result<()> {
    tally_core::tracing::init_tracing();
    let args = Args::parse();

    let config = DatabaseConfig::from_env().context("load database config")?;
    let db = tally_core::db::connect(&config)
        .await
        .context("connect to database")?;
    let ledger = Ledger::new(db, tally_migration::catalog());

    let output = match args.command {
        Command::Status => serde_json::to_value(ledger.status().await?)?,
        Command::Plan => {
            let pending: Vec<String> = ledger
                .plan()
                .await?
                .into_iter()
                .map(|m| m.id.to_string())
                .collect();
            json!({ "pending": pending })
        }
        Command::Up => {
            let report = ledger.migrate().await?;
            info!(applied = report.applied.len(), "migrate finished");
            json!({
                "applied": report.applied.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "already_applied": report.already_applied,
            })
        }
        Command::Unlock => json!({ "cleared": ledger.force_unlock().await? }),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
