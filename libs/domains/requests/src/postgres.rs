use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::{
    entity,
    error::{RequestError, RequestResult},
    models::{CreateItemRequest, ItemRequest},
    repository::ItemRequestRepository,
};

#[derive(Clone)]
pub struct PgItemRequestRepository {
    db: DatabaseConnection,
}

impl PgItemRequestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(e: DbErr) -> RequestError {
    RequestError::Internal(format!("Database error: {}", e))
}

#[async_trait]
impl ItemRequestRepository for PgItemRequestRepository {
    async fn create(
        &self,
        requestor_id: i64,
        input: CreateItemRequest,
        created: DateTime<Utc>,
    ) -> RequestResult<ItemRequest> {
        let active_model = entity::ActiveModel {
            description: Set(input.description),
            requestor_id: Set(requestor_id),
            created: Set(created.into()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(request_id = %model.id, requestor_id = %requestor_id, "Created item request");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> RequestResult<Option<ItemRequest>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn exists(&self, id: i64) -> RequestResult<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    async fn list_by_requestor(&self, requestor_id: i64) -> RequestResult<Vec<ItemRequest>> {
        let models = entity::Entity::find()
            .filter(entity::Column::RequestorId.eq(requestor_id))
            .order_by_desc(entity::Column::Created)
            .order_by_desc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_all(
        &self,
        excluded: Vec<i64>,
        offset: u64,
        limit: u64,
    ) -> RequestResult<Vec<ItemRequest>> {
        let mut query = entity::Entity::find();
        if !excluded.is_empty() {
            query = query.filter(entity::Column::Id.is_not_in(excluded));
        }

        let models = query
            .order_by_desc(entity::Column::Created)
            .order_by_desc(entity::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
