use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{self, NotSet, Set};

/// Lifecycle timestamps shared by entities that carry `created_at` and
/// `updated_at`.
///
/// Entities opt in explicitly and call [`Timestamped::stamp`] from their
/// `ActiveModelBehavior::before_save` hook, so every insert or update issued
/// through the ActiveModel write path refreshes `updated_at`. Bulk
/// `update_many` statements bypass the hook.
pub trait Timestamped {
    fn created_at_mut(&mut self) -> &mut ActiveValue<DateTime<Utc>>;
    fn updated_at_mut(&mut self) -> &mut ActiveValue<DateTime<Utc>>;

    /// Set `created_at` on insert only and `updated_at` on every save.
    /// On update `created_at` is dropped from the statement, so it can never
    /// be rewritten after creation.
    fn stamp(&mut self, insert: bool, now: DateTime<Utc>) {
        if insert {
            *self.created_at_mut() = Set(now);
        } else {
            *self.created_at_mut() = NotSet;
        }
        *self.updated_at_mut() = Set(now);
    }
}

/// Implement [`Timestamped`] for an entity's `ActiveModel` whose columns are
/// named `created_at` and `updated_at`.
#[macro_export]
macro_rules! impl_timestamped {
    ($active_model:ty) => {
        impl $crate::timestamps::Timestamped for $active_model {
            fn created_at_mut(
                &mut self,
            ) -> &mut ::sea_orm::ActiveValue<::chrono::DateTime<::chrono::Utc>> {
                &mut self.created_at
            }

            fn updated_at_mut(
                &mut self,
            ) -> &mut ::sea_orm::ActiveValue<::chrono::DateTime<::chrono::Utc>> {
                &mut self.updated_at
            }
        }
    };
}
