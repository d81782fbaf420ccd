use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema, SqlErr, TransactionTrait,
};
use sea_orm_migration::SchemaManager;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ddl;
use crate::entities::{applied_migration, ledger_lock};
use crate::error::LedgerError;
use crate::plan::{plan, resolve_order};
use crate::state::SchemaState;
use crate::types::{Migration, MigrationId, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
}

/// Result of a full [`Ledger::migrate`] run.
#[derive(Debug, Default)]
pub struct MigrateReport {
    /// Migrations applied by this run, in apply order.
    pub applied: Vec<MigrationId>,
    /// Migrations that were already recorded before the run started.
    pub already_applied: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub id: MigrationId,
    #[serde(serialize_with = "tally_core::serde::to_rfc3339_ms_opt")]
    pub applied_at: Option<DateTime<Utc>>,
}

struct LockToken {
    holder: String,
}

/// Applies a catalog of migrations to one database, exactly once each.
///
/// The storage handle is passed in at construction; the ledger never opens
/// connections of its own.
pub struct Ledger {
    db: DatabaseConnection,
    migrations: Vec<Migration>,
}

impl Ledger {
    pub fn new(db: DatabaseConnection, migrations: Vec<Migration>) -> Self {
        Self { db, migrations }
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Ids of every migration recorded as applied.
    pub async fn applied(&self) -> Result<BTreeSet<MigrationId>, LedgerError> {
        Ok(self.applied_records().await?.into_keys().collect())
    }

    /// Pending migrations in the order [`Ledger::migrate`] would apply them.
    pub async fn plan(&self) -> Result<Vec<&Migration>, LedgerError> {
        let applied = self.applied().await?;
        plan(&applied, &self.migrations)
    }

    /// Every catalog migration in apply order, with its applied-at time.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>, LedgerError> {
        let records = self.applied_records().await?;
        Ok(resolve_order(&self.migrations)?
            .into_iter()
            .map(|m| MigrationStatus {
                id: m.id.clone(),
                applied_at: records.get(&m.id).copied(),
            })
            .collect())
    }

    /// Schema shape produced by the applied migrations.
    pub async fn schema(&self) -> Result<SchemaState, LedgerError> {
        let applied = self.applied().await?;
        self.replay(&applied)
    }

    /// Apply one migration. Already-applied migrations are skipped; every
    /// dependency must be applied first.
    pub async fn apply(&self, id: &MigrationId) -> Result<ApplyOutcome, LedgerError> {
        let migration = self
            .migrations
            .iter()
            .find(|m| &m.id == id)
            .ok_or_else(|| LedgerError::UnknownMigration(id.clone()))?;

        let lock = self.acquire_lock().await?;
        let result = self.apply_locked(migration).await;
        let released = self.release_lock(&lock).await;
        let outcome = result?;
        released?;
        Ok(outcome)
    }

    /// Apply every pending migration in dependency order.
    ///
    /// The whole plan is computed before the first structural change, so a
    /// cycle or dangling dependency applies nothing. A failing migration
    /// stops the run; migrations applied before it stay recorded.
    pub async fn migrate(&self) -> Result<MigrateReport, LedgerError> {
        let lock = self.acquire_lock().await?;
        let result = self.migrate_locked().await;
        let released = self.release_lock(&lock).await;
        let report = result?;
        released?;
        Ok(report)
    }

    /// Clear a lock left behind by a crashed run. Returns `true` if a lock
    /// was present.
    pub async fn force_unlock(&self) -> Result<bool, LedgerError> {
        self.ensure_tables().await?;
        let result = ledger_lock::Entity::delete_many()
            .filter(ledger_lock::Column::Id.eq(ledger_lock::LOCK_ROW_ID))
            .exec(&self.db)
            .await?;
        let cleared = result.rows_affected > 0;
        if cleared {
            warn!("ledger lock cleared by operator");
        }
        Ok(cleared)
    }

    async fn migrate_locked(&self) -> Result<MigrateReport, LedgerError> {
        let applied = self.applied().await?;
        let pending = plan(&applied, &self.migrations)?;
        let mut state = self.replay(&applied)?;

        let mut report = MigrateReport {
            applied: Vec::with_capacity(pending.len()),
            already_applied: applied.len(),
        };
        for migration in pending {
            self.run(migration, &mut state).await?;
            report.applied.push(migration.id.clone());
        }

        if report.applied.is_empty() {
            info!(applied = report.already_applied, "schema is up to date");
        } else {
            info!(count = report.applied.len(), "migrations applied");
        }
        Ok(report)
    }

    async fn apply_locked(&self, migration: &Migration) -> Result<ApplyOutcome, LedgerError> {
        let applied = self.applied().await?;
        if applied.contains(&migration.id) {
            info!(migration = %migration.id, "already applied, skipping");
            return Ok(ApplyOutcome::AlreadyApplied);
        }
        if let Some(dependency) = migration
            .dependencies
            .iter()
            .find(|d| !applied.contains(*d))
        {
            return Err(LedgerError::UnappliedDependency {
                migration: migration.id.clone(),
                dependency: dependency.clone(),
            });
        }

        let mut state = self.replay(&applied)?;
        self.run(migration, &mut state).await?;
        Ok(ApplyOutcome::Applied)
    }

    /// Execute one migration against storage and record it.
    /// `state` is advanced only once the record is written.
    async fn run(&self, migration: &Migration, state: &mut SchemaState) -> Result<(), LedgerError> {
        // Validate every operation before the first structural change.
        let mut projected = state.clone();
        for (step, op) in migration.operations.iter().enumerate() {
            projected
                .apply(op)
                .map_err(|source| LedgerError::InvalidOperation {
                    migration: migration.id.clone(),
                    step,
                    source,
                })?;
        }

        let manager = SchemaManager::new(&self.db);
        let mut current = state.clone();
        for (step, op) in migration.operations.iter().enumerate() {
            let before = current.clone();
            current
                .apply(op)
                .map_err(|source| LedgerError::InvalidOperation {
                    migration: migration.id.clone(),
                    step,
                    source,
                })?;
            self.execute(&manager, op, &before, &current)
                .await
                .map_err(|source| LedgerError::ApplyFailure {
                    migration: migration.id.clone(),
                    step,
                    operation: op.to_string(),
                    source,
                })?;
            debug!(migration = %migration.id, step, operation = %op, "operation committed");
        }

        applied_migration::ActiveModel {
            app: Set(migration.id.app.clone()),
            name: Set(migration.id.name.clone()),
            applied_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        *state = current;
        info!(
            migration = %migration.id,
            operations = migration.operations.len(),
            "migration applied"
        );
        Ok(())
    }

    async fn execute(
        &self,
        manager: &SchemaManager<'_>,
        op: &Operation,
        before: &SchemaState,
        after: &SchemaState,
    ) -> Result<(), DbErr> {
        let backend = self.db.get_database_backend();
        match op {
            Operation::CreateEntity { name, fields } => {
                manager
                    .create_table(ddl::create_table(backend, name, fields))
                    .await
            }
            Operation::AddField {
                entity,
                field,
                spec,
            } => {
                manager
                    .alter_table(ddl::add_column(backend, entity, field, spec))
                    .await
            }
            Operation::AlterField {
                entity,
                field,
                spec,
            } => {
                let previous = before
                    .entity(entity)
                    .and_then(|shape| shape.field(field))
                    .ok_or_else(|| {
                        DbErr::Custom(format!("{entity}.{field} missing from recorded schema"))
                    })?;
                if previous.storage_eq(spec) {
                    debug!(%entity, %field, "no storage change, recording only");
                    return Ok(());
                }
                match backend {
                    DatabaseBackend::Sqlite => {
                        let shape = after.entity(entity).ok_or_else(|| {
                            DbErr::Custom(format!("{entity} missing from recorded schema"))
                        })?;
                        ddl::rebuild_table(&self.db, entity, shape).await
                    }
                    _ => {
                        let statements = ddl::alter_column(backend, entity, field, previous, spec);
                        let txn = self.db.begin().await?;
                        for statement in statements {
                            txn.execute(statement).await?;
                        }
                        txn.commit().await
                    }
                }
            }
        }
    }

    fn replay(&self, applied: &BTreeSet<MigrationId>) -> Result<SchemaState, LedgerError> {
        for id in applied {
            if !self.migrations.iter().any(|m| &m.id == id) {
                warn!(migration = %id, "applied migration is not in the catalog");
            }
        }

        let mut state = SchemaState::default();
        for migration in resolve_order(&self.migrations)?
            .into_iter()
            .filter(|m| applied.contains(&m.id))
        {
            for (step, op) in migration.operations.iter().enumerate() {
                state
                    .apply(op)
                    .map_err(|source| LedgerError::InvalidOperation {
                        migration: migration.id.clone(),
                        step,
                        source,
                    })?;
            }
        }
        Ok(state)
    }

    async fn applied_records(&self) -> Result<BTreeMap<MigrationId, DateTime<Utc>>, LedgerError> {
        self.ensure_tables().await?;
        let rows = applied_migration::Entity::find().all(&self.db).await?;
        Ok(rows
            .into_iter()
            .map(|row| (MigrationId::new(row.app, row.name), row.applied_at))
            .collect())
    }

    async fn ensure_tables(&self) -> Result<(), LedgerError> {
        let schema = Schema::new(self.db.get_database_backend());
        let manager = SchemaManager::new(&self.db);
        manager
            .create_table(
                schema
                    .create_table_from_entity(applied_migration::Entity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(ledger_lock::Entity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn acquire_lock(&self) -> Result<LockToken, LedgerError> {
        self.ensure_tables().await?;
        let holder = Uuid::new_v4().to_string();
        let row = ledger_lock::ActiveModel {
            id: Set(ledger_lock::LOCK_ROW_ID),
            holder: Set(holder.clone()),
            acquired_at: Set(Utc::now()),
        };
        match row.insert(&self.db).await {
            Ok(_) => {
                debug!(%holder, "ledger lock acquired");
                Ok(LockToken { holder })
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                match ledger_lock::Entity::find_by_id(ledger_lock::LOCK_ROW_ID)
                    .one(&self.db)
                    .await?
                {
                    Some(lock) => Err(LedgerError::Locked {
                        holder: lock.holder,
                        since: lock.acquired_at,
                    }),
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn release_lock(&self, lock: &LockToken) -> Result<(), LedgerError> {
        let result = ledger_lock::Entity::delete_many()
            .filter(ledger_lock::Column::Id.eq(ledger_lock::LOCK_ROW_ID))
            .filter(ledger_lock::Column::Holder.eq(lock.holder.as_str()))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            warn!(holder = %lock.holder, "ledger lock was cleared while held");
        } else {
            debug!(holder = %lock.holder, "ledger lock released");
        }
        Ok(())
    }
}
