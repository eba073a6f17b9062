use async_trait::async_trait;
use database::postgres::is_unique_violation;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{CreateUser, UpdateUser, User},
    repository::UserRepository,
};

#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

/// The unique index on `users.email` settles racing writers
fn write_error(e: DbErr, email: &str) -> UserError {
    if is_unique_violation(&e) {
        UserError::EmailConflict(email.to_string())
    } else {
        db_error(e)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let active_model = entity::ActiveModel {
            name: Set(input.name),
            email: Set(input.email.clone()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, &input.email))?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn update(&self, id: i64, input: UpdateUser) -> UserResult<Option<User>> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let Some(model) = entity::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };

        if let Some(email) = input.email.as_deref().filter(|e| *e != model.email) {
            let taken = entity::Entity::find()
                .filter(entity::Column::Email.eq(email))
                .filter(entity::Column::Id.ne(id))
                .one(&txn)
                .await
                .map_err(db_error)?
                .is_some();
            if taken {
                return Err(UserError::EmailConflict(email.to_string()));
            }
        }

        let email = input.email.clone().unwrap_or_else(|| model.email.clone());
        let mut active_model: entity::ActiveModel = model.into();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(new_email) = input.email {
            active_model.email = Set(new_email);
        }

        let updated = active_model
            .update(&txn)
            .await
            .map_err(|e| write_error(e, &email))?;
        txn.commit().await.map_err(db_error)?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, id: i64) -> UserResult<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}
