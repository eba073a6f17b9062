use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_requests::{RequestItem, RequestResult, RequestedItems};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::{
    entity::{comment, item},
    error::{ItemError, ItemResult},
    models::{CommentRecord, CreateItem, Item, UpdateItem},
    repository::ItemRepository,
};

#[derive(Clone)]
pub struct PgItemRepository {
    db: DatabaseConnection,
}

impl PgItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_items(&self, condition: Condition) -> ItemResult<Vec<Item>> {
        let models = item::Entity::find()
            .filter(condition)
            .order_by_asc(item::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

fn db_error(e: DbErr) -> ItemError {
    ItemError::Internal(format!("Database error: {}", e))
}

/// `%text%` for LIKE, lowercased, with wildcards in `text` matched literally
fn contains_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(&self, owner_id: i64, input: CreateItem) -> ItemResult<Item> {
        let active_model = item::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            available: Set(input.available.unwrap_or_default()),
            owner_id: Set(owner_id),
            request_id: Set(input.request_id),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(item_id = %model.id, owner_id = %owner_id, "Created item");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        let model = item::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, id: i64, input: UpdateItem) -> ItemResult<Option<Item>> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let Some(model) = item::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };

        let mut active_model: item::ActiveModel = model.into();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(description) = input.description {
            active_model.description = Set(description);
        }
        if let Some(available) = input.available {
            active_model.available = Set(available);
        }

        let updated = active_model.update(&txn).await.map_err(db_error)?;
        txn.commit().await.map_err(db_error)?;

        tracing::info!(item_id = %id, "Updated item");
        Ok(Some(updated.into()))
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        offset: u64,
        limit: u64,
    ) -> ItemResult<Vec<Item>> {
        let models = item::Entity::find()
            .filter(item::Column::OwnerId.eq(owner_id))
            .order_by_asc(item::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn search(&self, text: String, offset: u64, limit: u64) -> ItemResult<Vec<Item>> {
        let pattern = contains_pattern(&text);

        let models = item::Entity::find()
            .filter(item::Column::Available.eq(true))
            .filter(Expr::cust_with_values(
                "(LOWER(\"items\".\"name\") LIKE $1 OR LOWER(\"items\".\"description\") LIKE $2)",
                [pattern.clone(), pattern],
            ))
            .order_by_asc(item::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn ids_by_owner(&self, owner_id: i64) -> ItemResult<Vec<i64>> {
        item::Entity::find()
            .select_only()
            .column(item::Column::Id)
            .filter(item::Column::OwnerId.eq(owner_id))
            .order_by_asc(item::Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_error)
    }

    async fn list_by_request(&self, request_id: i64) -> ItemResult<Vec<Item>> {
        self.find_items(Condition::all().add(item::Column::RequestId.eq(request_id)))
            .await
    }

    async fn list_requested(&self) -> ItemResult<Vec<Item>> {
        self.find_items(Condition::all().add(item::Column::RequestId.is_not_null()))
            .await
    }

    async fn add_comment(
        &self,
        item_id: i64,
        author_id: i64,
        text: String,
        created: DateTime<Utc>,
    ) -> ItemResult<CommentRecord> {
        let active_model = comment::ActiveModel {
            text: Set(text),
            item_id: Set(item_id),
            author_id: Set(author_id),
            created: Set(created.into()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(comment_id = %model.id, item_id = %item_id, "Added comment");
        Ok(model.into())
    }

    async fn list_comments(&self, item_id: i64) -> ItemResult<Vec<CommentRecord>> {
        let models = comment::Entity::find()
            .filter(comment::Column::ItemId.eq(item_id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RequestedItems for PgItemRepository {
    async fn items_for_request(&self, request_id: i64) -> RequestResult<Vec<RequestItem>> {
        let items = self.list_by_request(request_id).await?;
        Ok(items.iter().filter_map(Item::as_request_item).collect())
    }

    async fn requested_items(&self) -> RequestResult<Vec<RequestItem>> {
        let items = self.list_requested().await?;
        Ok(items.iter().filter_map(Item::as_request_item).collect())
    }
}
