use axum_helpers::Page;
use chrono::Utc;
use domain_users::UserRepository;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{RequestError, RequestResult};
use crate::models::{CreateItemRequest, ItemRequest, ItemRequestDetails, RequestItem};
use crate::repository::{ItemRequestRepository, RequestedItems};

/// Service layer for the request board
#[derive(Clone)]
pub struct RequestService<R: ItemRequestRepository> {
    repository: Arc<R>,
    users: Arc<dyn UserRepository>,
    items: Arc<dyn RequestedItems>,
}

impl<R: ItemRequestRepository> RequestService<R> {
    pub fn new(
        repository: R,
        users: Arc<dyn UserRepository>,
        items: Arc<dyn RequestedItems>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            users,
            items,
        }
    }

    async fn ensure_user(&self, user_id: i64) -> RequestResult<()> {
        if self.users.exists(user_id).await? {
            Ok(())
        } else {
            Err(RequestError::UserNotFound(user_id))
        }
    }

    async fn with_items(&self, request: ItemRequest) -> RequestResult<ItemRequestDetails> {
        let items = self.items.items_for_request(request.id).await?;
        Ok(ItemRequestDetails::new(request, items))
    }

    #[instrument(skip(self, input), fields(requestor_id = %requestor_id))]
    pub async fn create_request(
        &self,
        requestor_id: i64,
        input: CreateItemRequest,
    ) -> RequestResult<ItemRequest> {
        self.ensure_user(requestor_id).await?;
        self.repository
            .create(requestor_id, input, Utc::now())
            .await
    }

    #[instrument(skip(self), fields(request_id = %id))]
    pub async fn get_request(&self, caller_id: i64, id: i64) -> RequestResult<ItemRequestDetails> {
        self.ensure_user(caller_id).await?;
        let request = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(RequestError::NotFound(id))?;

        self.with_items(request).await
    }

    #[instrument(skip(self))]
    pub async fn list_own_requests(
        &self,
        requestor_id: i64,
    ) -> RequestResult<Vec<ItemRequestDetails>> {
        self.ensure_user(requestor_id).await?;

        let requests = self.repository.list_by_requestor(requestor_id).await?;
        let mut result = Vec::with_capacity(requests.len());
        for request in requests {
            result.push(self.with_items(request).await?);
        }
        Ok(result)
    }

    /// Requests of everyone, newest first.
    ///
    /// A request that already has an item listed against it by someone other
    /// than the caller is left out. The filter runs before paging.
    #[instrument(skip(self))]
    pub async fn list_all_requests(
        &self,
        caller_id: i64,
        page: Page,
    ) -> RequestResult<Vec<ItemRequestDetails>> {
        let requested = self.items.requested_items().await?;

        let excluded: BTreeSet<i64> = requested
            .iter()
            .filter(|item| item.owner_id != caller_id)
            .map(|item| item.request_id)
            .collect();

        let mut by_request: HashMap<i64, Vec<RequestItem>> = HashMap::new();
        for item in requested {
            by_request.entry(item.request_id).or_default().push(item);
        }

        let requests = self
            .repository
            .list_all(excluded.into_iter().collect(), page.from, page.size)
            .await?;

        Ok(requests
            .into_iter()
            .map(|request| {
                let mut items = by_request.remove(&request.id).unwrap_or_default();
                items.sort_by_key(|item| item.id);
                ItemRequestDetails::new(request, items)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockItemRequestRepository, MockRequestedItems};
    use chrono::DateTime;
    use domain_users::{CreateUser, InMemoryUserRepository};
    use mockall::predicate::eq;

    fn request(id: i64, requestor_id: i64) -> ItemRequest {
        ItemRequest {
            id,
            description: format!("request {}", id),
            requestor_id,
            created: DateTime::from_timestamp(1_700_000_000 + id, 0).unwrap(),
        }
    }

    fn item(id: i64, request_id: i64, owner_id: i64) -> RequestItem {
        RequestItem {
            id,
            name: format!("item {}", id),
            description: "desc".to_string(),
            available: true,
            request_id,
            owner_id,
        }
    }

    async fn users_with(count: usize) -> Arc<dyn UserRepository> {
        let users = InMemoryUserRepository::new();
        for i in 0..count {
            users
                .create(CreateUser {
                    name: format!("user{}", i),
                    email: format!("user{}@mail.com", i),
                })
                .await
                .unwrap();
        }
        Arc::new(users)
    }

    #[tokio::test]
    async fn test_create_requires_existing_user() {
        let mut repo = MockItemRequestRepository::new();
        repo.expect_create().never();

        let service = RequestService::new(
            repo,
            users_with(0).await,
            Arc::new(MockRequestedItems::new()),
        );
        let result = service
            .create_request(
                1,
                CreateItemRequest {
                    description: "Need a tent".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(RequestError::UserNotFound(1))));
    }

    #[tokio::test]
    async fn test_get_checks_user_before_request() {
        let mut repo = MockItemRequestRepository::new();
        repo.expect_get_by_id().never();

        let service = RequestService::new(
            repo,
            users_with(0).await,
            Arc::new(MockRequestedItems::new()),
        );

        assert!(matches!(
            service.get_request(4, 1).await,
            Err(RequestError::UserNotFound(4))
        ));
    }

    #[tokio::test]
    async fn test_get_embeds_items() {
        let mut repo = MockItemRequestRepository::new();
        repo.expect_get_by_id()
            .with(eq(3))
            .returning(|id| Ok(Some(request(id, 1))));

        let mut items = MockRequestedItems::new();
        items
            .expect_items_for_request()
            .with(eq(3))
            .returning(|request_id| Ok(vec![item(10, request_id, 2)]));

        let service = RequestService::new(repo, users_with(2).await, Arc::new(items));
        let details = service.get_request(1, 3).await.unwrap();

        assert_eq!(details.id, 3);
        assert_eq!(details.items, vec![item(10, 3, 2)]);
    }

    #[tokio::test]
    async fn test_get_missing_request() {
        let mut repo = MockItemRequestRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let service = RequestService::new(
            repo,
            users_with(1).await,
            Arc::new(MockRequestedItems::new()),
        );

        assert!(matches!(
            service.get_request(1, 8).await,
            Err(RequestError::NotFound(8))
        ));
    }

    #[tokio::test]
    async fn test_list_all_excludes_requests_answered_by_others() {
        let mut items = MockRequestedItems::new();
        items.expect_requested_items().returning(|| {
            Ok(vec![
                // request 1 answered by the caller: kept
                item(10, 1, 5),
                // request 2 answered by someone else: dropped
                item(11, 2, 6),
            ])
        });

        let mut repo = MockItemRequestRepository::new();
        repo.expect_list_all()
            .with(eq(vec![2i64]), eq(0u64), eq(20u64))
            .returning(|_, _, _| Ok(vec![request(3, 1), request(1, 1)]));

        let service = RequestService::new(repo, users_with(0).await, Arc::new(items));
        let result = service.list_all_requests(5, Page::default()).await.unwrap();

        let ids: Vec<i64> = result.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(result[0].items.is_empty());
        assert_eq!(result[1].items, vec![item(10, 1, 5)]);
    }
}
