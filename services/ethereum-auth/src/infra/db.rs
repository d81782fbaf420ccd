use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

use tally_schema::nonces;

use crate::domain::repository::NonceRepository;
use crate::domain::types::{NewNonce, Nonce};
use crate::error::NonceError;

#[derive(Clone)]
pub struct DbNonceRepository {
    pub db: DatabaseConnection,
}

impl NonceRepository for DbNonceRepository {
    async fn insert(&self, nonce: &NewNonce) -> Result<Nonce, NonceError> {
        let result = nonces::ActiveModel {
            value: Set(nonce.value.clone()),
            created_at: Set(nonce.created_at),
            expires_at: Set(nonce.expires_at),
            used: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(model) => Ok(nonce_from_model(model)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(NonceError::Collision)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert nonce").into()),
        }
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<Nonce>, NonceError> {
        let model = nonces::Entity::find()
            .filter(nonces::Column::Value.eq(value))
            .one(&self.db)
            .await
            .context("find nonce by value")?;
        Ok(model.map(nonce_from_model))
    }

    async fn mark_used_if_valid(
        &self,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, NonceError> {
        let result = nonces::Entity::update_many()
            .col_expr(nonces::Column::Used, Expr::value(true))
            .filter(nonces::Column::Value.eq(value))
            .filter(nonces::Column::Used.eq(false))
            .filter(nonces::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("mark nonce used")?;
        Ok(result.rows_affected == 1)
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<Nonce>, NonceError> {
        let models = nonces::Entity::find()
            .order_by_desc(nonces::Column::CreatedAt)
            .order_by_desc(nonces::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list nonces")?;
        Ok(models.into_iter().map(nonce_from_model).collect())
    }
}

fn nonce_from_model(m: nonces::Model) -> Nonce {
    Nonce {
        id: m.id,
        value: m.value,
        created_at: m.created_at,
        expires_at: m.expires_at,
        used: m.used,
    }
}
