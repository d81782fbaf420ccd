use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::state::StateError;
use crate::types::MigrationId;

/// Schema ledger error variants.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("dependency cycle among {}", join_ids(.involved))]
    Cycle { involved: Vec<MigrationId> },
    #[error("{migration} depends on {dependency}, which is not available")]
    MissingDependency {
        migration: MigrationId,
        dependency: MigrationId,
    },
    #[error("migration {0} is declared more than once")]
    DuplicateMigration(MigrationId),
    #[error("{migration} is applied but its dependency {dependency} is not")]
    InconsistentHistory {
        migration: MigrationId,
        dependency: MigrationId,
    },
    #[error("unknown migration {0}")]
    UnknownMigration(MigrationId),
    #[error("cannot apply {migration}: dependency {dependency} is not applied")]
    UnappliedDependency {
        migration: MigrationId,
        dependency: MigrationId,
    },
    #[error("{migration} step {step} is invalid against the recorded schema")]
    InvalidOperation {
        migration: MigrationId,
        step: usize,
        #[source]
        source: StateError,
    },
    #[error("{migration} failed at step {step} ({operation})")]
    ApplyFailure {
        migration: MigrationId,
        step: usize,
        operation: String,
        #[source]
        source: DbErr,
    },
    #[error("ledger is locked by {holder} since {since}")]
    Locked { holder: String, since: DateTime<Utc> },
    #[error("ledger storage error")]
    Database(#[from] DbErr),
}

impl LedgerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cycle { .. } => "CYCLE",
            Self::MissingDependency { .. } => "MISSING_DEPENDENCY",
            Self::DuplicateMigration(_) => "DUPLICATE_MIGRATION",
            Self::InconsistentHistory { .. } => "INCONSISTENT_HISTORY",
            Self::UnknownMigration(_) => "UNKNOWN_MIGRATION",
            Self::UnappliedDependency { .. } => "UNAPPLIED_DEPENDENCY",
            Self::InvalidOperation { .. } => "INVALID_OPERATION",
            Self::ApplyFailure { .. } => "APPLY_FAILURE",
            Self::Locked { .. } => "LOCKED",
            Self::Database(_) => "DATABASE",
        }
    }
}

fn join_ids(ids: &[MigrationId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
