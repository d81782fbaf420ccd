use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::timestamps::Timestamped;

/// Kind of contribution participants can submit (Node Runner, Uptime, Blog
/// Post, …).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contribution_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: Option<String>,
    pub description: String,
    pub min_points: i32,
    pub max_points: i32,
    /// Included by default when creating validators.
    pub is_default: bool,
    pub is_submittable: bool,
    /// Free-form icon identifier such as `mdi:star` or `fa-solid fa-star`.
    pub icon: String,
    pub examples: Examples,
    pub is_highlight: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Short example entries, stored as a JSON array of strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Examples(pub Vec<String>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

crate::impl_timestamped!(ActiveModel);

/// Column default of `min_points`.
pub const DEFAULT_MIN_POINTS: i32 = 0;
/// Column default of `max_points`.
pub const DEFAULT_MAX_POINTS: i32 = 100;

fn check_points(min: i32, max: i32) -> Result<(), DbErr> {
    if min < 0 || max < 0 {
        return Err(DbErr::Custom("points must not be negative".to_owned()));
    }
    if max < min {
        return Err(DbErr::Custom(
            "maximum points must be greater than or equal to minimum points".to_owned(),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        // Points left out of the write take the column default on insert and
        // the stored value on update.
        let partial = self.min_points.is_not_set() || self.max_points.is_not_set();
        let stored = if !insert && partial {
            match self.id.try_as_ref() {
                Some(id) => Entity::find_by_id(*id).one(db).await?,
                None => None,
            }
        } else {
            None
        };
        let min = match self.min_points.try_as_ref() {
            Some(v) => *v,
            None => stored.as_ref().map_or(DEFAULT_MIN_POINTS, |m| m.min_points),
        };
        let max = match self.max_points.try_as_ref() {
            Some(v) => *v,
            None => stored.as_ref().map_or(DEFAULT_MAX_POINTS, |m| m.max_points),
        };
        check_points(min, max)?;

        self.stamp(insert, chrono::Utc::now());
        Ok(self)
    }
}
