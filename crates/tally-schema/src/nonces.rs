use sea_orm::entity::prelude::*;

/// Single-use challenge issued for wallet-signature sign-in.
/// Only `used` ever changes after insert; rows are never deleted implicitly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "nonces")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub value: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
