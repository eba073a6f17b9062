use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_requests::{RequestItem, RequestResult, RequestedItems};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ItemResult;
use crate::models::{BookingSnapshot, CommentRecord, CreateItem, Item, UpdateItem};

/// Repository trait for items and their comments
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, owner_id: i64, input: CreateItem) -> ItemResult<Item>;

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>>;

    /// Patch an item in one read-modify-write step.
    ///
    /// Returns `None` when the item does not exist.
    async fn update(&self, id: i64, input: UpdateItem) -> ItemResult<Option<Item>>;

    /// Items of one owner, ascending by id
    async fn list_by_owner(
        &self,
        owner_id: i64,
        offset: u64,
        limit: u64,
    ) -> ItemResult<Vec<Item>>;

    /// Available items whose name or description contains `text`, ignoring
    /// case, ascending by id
    async fn search(&self, text: String, offset: u64, limit: u64) -> ItemResult<Vec<Item>>;

    async fn ids_by_owner(&self, owner_id: i64) -> ItemResult<Vec<i64>>;

    /// Items listed against `request_id`, ascending by id
    async fn list_by_request(&self, request_id: i64) -> ItemResult<Vec<Item>>;

    /// Every item with a request reference
    async fn list_requested(&self) -> ItemResult<Vec<Item>>;

    async fn add_comment(
        &self,
        item_id: i64,
        author_id: i64,
        text: String,
        created: DateTime<Utc>,
    ) -> ItemResult<CommentRecord>;

    /// Comments on one item, ascending by id
    async fn list_comments(&self, item_id: i64) -> ItemResult<Vec<CommentRecord>>;
}

/// Booking facts the catalog needs.
///
/// Bookings live downstream of items, so the bookings domain implements this.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingHistory: Send + Sync {
    /// Latest-ending booking that started before `now`, rejected ones excluded
    async fn last_booking(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<Option<BookingSnapshot>>;

    /// Earliest booking starting after `now`, rejected ones excluded
    async fn next_booking(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<Option<BookingSnapshot>>;

    /// Whether `booker_id` holds an approved booking of `item_id` that started
    /// before `now`
    async fn has_started_approved_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<bool>;
}

fn request_items(items: Vec<Item>) -> Vec<RequestItem> {
    items.iter().filter_map(Item::as_request_item).collect()
}

#[derive(Debug, Default)]
struct State {
    items: BTreeMap<i64, Item>,
    comments: BTreeMap<i64, CommentRecord>,
    next_item_id: i64,
    next_comment_id: i64,
}

/// In-memory implementation of ItemRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn items_where(&self, keep: impl Fn(&Item) -> bool) -> Vec<Item> {
        let state = self.state.read().await;
        state.items.values().filter(|&i| keep(i)).cloned().collect()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, owner_id: i64, input: CreateItem) -> ItemResult<Item> {
        let mut state = self.state.write().await;

        state.next_item_id += 1;
        let item = Item {
            id: state.next_item_id,
            name: input.name,
            description: input.description,
            available: input.available.unwrap_or_default(),
            owner: owner_id,
            request_id: input.request_id,
        };
        state.items.insert(item.id, item.clone());

        tracing::info!(item_id = %item.id, owner_id = %owner_id, "Created item");
        Ok(item)
    }

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        let state = self.state.read().await;
        Ok(state.items.get(&id).cloned())
    }

    async fn update(&self, id: i64, input: UpdateItem) -> ItemResult<Option<Item>> {
        let mut state = self.state.write().await;

        let Some(item) = state.items.get_mut(&id) else {
            return Ok(None);
        };
        item.apply_update(input);

        tracing::info!(item_id = %id, "Updated item");
        Ok(Some(item.clone()))
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        offset: u64,
        limit: u64,
    ) -> ItemResult<Vec<Item>> {
        let items = self.items_where(|i| i.owner == owner_id).await;
        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn search(&self, text: String, offset: u64, limit: u64) -> ItemResult<Vec<Item>> {
        let items = self.items_where(|i| i.available && i.matches(&text)).await;
        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn ids_by_owner(&self, owner_id: i64) -> ItemResult<Vec<i64>> {
        let items = self.items_where(|i| i.owner == owner_id).await;
        Ok(items.into_iter().map(|i| i.id).collect())
    }

    async fn list_by_request(&self, request_id: i64) -> ItemResult<Vec<Item>> {
        Ok(self.items_where(|i| i.request_id == Some(request_id)).await)
    }

    async fn list_requested(&self) -> ItemResult<Vec<Item>> {
        Ok(self.items_where(|i| i.request_id.is_some()).await)
    }

    async fn add_comment(
        &self,
        item_id: i64,
        author_id: i64,
        text: String,
        created: DateTime<Utc>,
    ) -> ItemResult<CommentRecord> {
        let mut state = self.state.write().await;

        state.next_comment_id += 1;
        let comment = CommentRecord {
            id: state.next_comment_id,
            text,
            item_id,
            author_id,
            created,
        };
        state.comments.insert(comment.id, comment.clone());

        tracing::info!(comment_id = %comment.id, item_id = %item_id, "Added comment");
        Ok(comment)
    }

    async fn list_comments(&self, item_id: i64) -> ItemResult<Vec<CommentRecord>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.item_id == item_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestedItems for InMemoryItemRepository {
    async fn items_for_request(&self, request_id: i64) -> RequestResult<Vec<RequestItem>> {
        Ok(request_items(self.list_by_request(request_id).await?))
    }

    async fn requested_items(&self) -> RequestResult<Vec<RequestItem>> {
        Ok(request_items(self.list_requested().await?))
    }
}
