use sea_orm::entity::prelude::*;

/// Single-row marker held while a ledger run is in progress.
/// The row id is fixed, so a second concurrent insert violates the primary key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tally_migration_lock")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub holder: String,
    pub acquired_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Id of the only row the lock table ever holds.
pub const LOCK_ROW_ID: i32 = 1;
