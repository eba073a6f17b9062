use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::RequestResult;
use crate::models::{CreateItemRequest, ItemRequest, RequestItem};

/// Repository trait for ItemRequest persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRequestRepository: Send + Sync {
    async fn create(
        &self,
        requestor_id: i64,
        input: CreateItemRequest,
        created: DateTime<Utc>,
    ) -> RequestResult<ItemRequest>;

    async fn get_by_id(&self, id: i64) -> RequestResult<Option<ItemRequest>>;

    async fn exists(&self, id: i64) -> RequestResult<bool>;

    /// Requests of one requestor, newest first
    async fn list_by_requestor(&self, requestor_id: i64) -> RequestResult<Vec<ItemRequest>>;

    /// All requests except `excluded`, newest first, one offset window
    async fn list_all(
        &self,
        excluded: Vec<i64>,
        offset: u64,
        limit: u64,
    ) -> RequestResult<Vec<ItemRequest>>;
}

/// Items listed against requests.
///
/// Items live downstream of requests, so the items domain implements this.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestedItems: Send + Sync {
    /// Items whose request reference is `request_id`, ascending by id
    async fn items_for_request(&self, request_id: i64) -> RequestResult<Vec<RequestItem>>;

    /// Every item with a request reference
    async fn requested_items(&self) -> RequestResult<Vec<RequestItem>>;
}

/// Newest first; ties broken by id so paging is stable
fn newest_first(a: &ItemRequest, b: &ItemRequest) -> std::cmp::Ordering {
    b.created.cmp(&a.created).then(b.id.cmp(&a.id))
}

#[derive(Debug, Default)]
struct State {
    requests: BTreeMap<i64, ItemRequest>,
    next_id: i64,
}

/// In-memory implementation of ItemRequestRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRequestRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryItemRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRequestRepository for InMemoryItemRequestRepository {
    async fn create(
        &self,
        requestor_id: i64,
        input: CreateItemRequest,
        created: DateTime<Utc>,
    ) -> RequestResult<ItemRequest> {
        let mut state = self.state.write().await;

        state.next_id += 1;
        let request = ItemRequest {
            id: state.next_id,
            description: input.description,
            requestor_id,
            created,
        };
        state.requests.insert(request.id, request.clone());

        tracing::info!(request_id = %request.id, requestor_id = %requestor_id, "Created item request");
        Ok(request)
    }

    async fn get_by_id(&self, id: i64) -> RequestResult<Option<ItemRequest>> {
        let state = self.state.read().await;
        Ok(state.requests.get(&id).cloned())
    }

    async fn exists(&self, id: i64) -> RequestResult<bool> {
        let state = self.state.read().await;
        Ok(state.requests.contains_key(&id))
    }

    async fn list_by_requestor(&self, requestor_id: i64) -> RequestResult<Vec<ItemRequest>> {
        let state = self.state.read().await;

        let mut result: Vec<ItemRequest> = state
            .requests
            .values()
            .filter(|r| r.requestor_id == requestor_id)
            .cloned()
            .collect();
        result.sort_by(newest_first);

        Ok(result)
    }

    async fn list_all(
        &self,
        excluded: Vec<i64>,
        offset: u64,
        limit: u64,
    ) -> RequestResult<Vec<ItemRequest>> {
        let state = self.state.read().await;

        let mut result: Vec<ItemRequest> = state
            .requests
            .values()
            .filter(|r| !excluded.contains(&r.id))
            .cloned()
            .collect();
        result.sort_by(newest_first);

        Ok(result
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(description: &str) -> CreateItemRequest {
        CreateItemRequest {
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryItemRequestRepository::new();
        let now = Utc::now();

        let created = repo.create(7, input("Need a drill"), now).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.requestor_id, 7);
        assert_eq!(created.created, now);
        assert_eq!(repo.get_by_id(1).await.unwrap(), Some(created));
        assert!(repo.exists(1).await.unwrap());
        assert!(!repo.exists(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_requestor_newest_first() {
        let repo = InMemoryItemRequestRepository::new();
        let now = Utc::now();

        let older = repo
            .create(1, input("old"), now - Duration::hours(2))
            .await
            .unwrap();
        let newer = repo.create(1, input("new"), now).await.unwrap();
        repo.create(2, input("someone else"), now).await.unwrap();

        let ids: Vec<i64> = repo
            .list_by_requestor(1)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_list_all_excludes_then_pages() {
        let repo = InMemoryItemRequestRepository::new();
        let now = Utc::now();

        for hours in 0..5 {
            repo.create(1, input("r"), now - Duration::hours(hours))
                .await
                .unwrap();
        }

        // newest first: 1, 2, 3, 4, 5; excluding 2 leaves 1, 3, 4, 5
        let page: Vec<i64> = repo
            .list_all(vec![2], 1, 2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(page, vec![3, 4]);
    }
}
