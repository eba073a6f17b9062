use axum_helpers::Page;
use chrono::Utc;
use domain_requests::ItemRequestRepository;
use domain_users::UserRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ItemError, ItemResult};
use crate::models::{Comment, CommentRecord, CreateComment, CreateItem, Item, ItemDetails, UpdateItem};
use crate::repository::{BookingHistory, ItemRepository};

/// Service layer for the catalog and the comment board
#[derive(Clone)]
pub struct ItemService<R: ItemRepository> {
    repository: Arc<R>,
    users: Arc<dyn UserRepository>,
    requests: Arc<dyn ItemRequestRepository>,
    bookings: Arc<dyn BookingHistory>,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(
        repository: R,
        users: Arc<dyn UserRepository>,
        requests: Arc<dyn ItemRequestRepository>,
        bookings: Arc<dyn BookingHistory>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            users,
            requests,
            bookings,
        }
    }

    async fn ensure_user(&self, user_id: i64) -> ItemResult<()> {
        if self.users.exists(user_id).await? {
            Ok(())
        } else {
            Err(ItemError::UserNotFound(user_id))
        }
    }

    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn get_item(&self, id: i64) -> ItemResult<Item> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    /// Comments resolve author names; authors that no longer exist drop out
    async fn comments_for(&self, item_id: i64) -> ItemResult<Vec<Comment>> {
        let records = self.repository.list_comments(item_id).await?;

        let mut names: HashMap<i64, String> = HashMap::new();
        let mut comments = Vec::with_capacity(records.len());
        for record in records {
            if !names.contains_key(&record.author_id) {
                match self.users.get_by_id(record.author_id).await? {
                    Some(user) => {
                        names.insert(user.id, user.name);
                    }
                    None => continue,
                }
            }
            if let Some(author_name) = names.get(&record.author_id) {
                comments.push(render_comment(record, author_name.clone()));
            }
        }
        Ok(comments)
    }

    async fn details(&self, item: Item, with_bookings: bool) -> ItemResult<ItemDetails> {
        let comments = self.comments_for(item.id).await?;

        let (last, next) = if with_bookings {
            let now = Utc::now();
            (
                self.bookings.last_booking(item.id, now).await?,
                self.bookings.next_booking(item.id, now).await?,
            )
        } else {
            (None, None)
        };

        Ok(ItemDetails::new(item, last, next, comments))
    }

    /// Comments always; last and next booking only for the owner
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_item_details(&self, caller_id: i64, item_id: i64) -> ItemResult<ItemDetails> {
        let item = self.get_item(item_id).await?;
        let is_owner = item.owner == caller_id;
        self.details(item, is_owner).await
    }

    #[instrument(skip(self))]
    pub async fn list_owner_items(&self, owner_id: i64, page: Page) -> ItemResult<Vec<ItemDetails>> {
        self.ensure_user(owner_id).await?;

        let items = self
            .repository
            .list_by_owner(owner_id, page.from, page.size)
            .await?;

        let mut result = Vec::with_capacity(items.len());
        for item in items {
            result.push(self.details(item, true).await?);
        }
        Ok(result)
    }

    /// Blank text yields nothing rather than the whole catalog
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str, page: Page) -> ItemResult<Vec<Item>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.repository
            .search(text.to_string(), page.from, page.size)
            .await
    }

    #[instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn create_item(&self, owner_id: i64, input: CreateItem) -> ItemResult<Item> {
        self.ensure_user(owner_id).await?;

        if let Some(request_id) = input.request_id {
            if !self.requests.exists(request_id).await? {
                return Err(ItemError::RequestNotFound(request_id));
            }
        }

        self.repository.create(owner_id, input).await
    }

    #[instrument(skip(self, input), fields(item_id = %item_id))]
    pub async fn update_item(
        &self,
        caller_id: i64,
        item_id: i64,
        input: UpdateItem,
    ) -> ItemResult<Item> {
        let item = self.get_item(item_id).await?;
        self.ensure_user(caller_id).await?;

        if item.owner != caller_id {
            return Err(ItemError::AccessViolation {
                user_id: caller_id,
                item_id,
            });
        }

        self.repository
            .update(item_id, input)
            .await?
            .ok_or(ItemError::NotFound(item_id))
    }

    /// Whether the user holds an approved booking of the item that has started
    pub async fn can_comment(&self, user_id: i64, item_id: i64) -> ItemResult<bool> {
        self.bookings
            .has_started_approved_booking(user_id, item_id, Utc::now())
            .await
    }

    #[instrument(skip(self, input), fields(item_id = %item_id, author_id = %author_id))]
    pub async fn add_comment(
        &self,
        author_id: i64,
        item_id: i64,
        input: CreateComment,
    ) -> ItemResult<Comment> {
        if !self.can_comment(author_id, item_id).await? {
            return Err(ItemError::CommentAccessViolation);
        }
        if input.text.trim().is_empty() {
            return Err(ItemError::TextValidation);
        }
        self.get_item(item_id).await?;
        let author = self
            .users
            .get_by_id(author_id)
            .await?
            .ok_or(ItemError::UserNotFound(author_id))?;

        let record = self
            .repository
            .add_comment(item_id, author_id, input.text, Utc::now())
            .await?;

        Ok(render_comment(record, author.name))
    }

    /// Comments on one item, ascending by id
    pub async fn list_comments(&self, item_id: i64) -> ItemResult<Vec<Comment>> {
        self.comments_for(item_id).await
    }
}

fn render_comment(record: CommentRecord, author_name: String) -> Comment {
    Comment {
        id: record.id,
        text: record.text,
        item_id: record.item_id,
        author_name,
        created: record.created,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingSnapshot;
    use crate::repository::{MockBookingHistory, MockItemRepository};
    use chrono::{DateTime, Duration};
    use domain_requests::InMemoryItemRequestRepository;
    use domain_users::{CreateUser, InMemoryUserRepository};
    use mockall::predicate::{always, eq};

    fn drill(owner: i64) -> Item {
        Item {
            id: 1,
            name: "Drill".to_string(),
            description: "Cordless".to_string(),
            available: true,
            owner,
            request_id: None,
        }
    }

    fn snapshot(id: i64) -> BookingSnapshot {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        BookingSnapshot {
            id,
            start,
            end: start + Duration::days(1),
            item_id: 1,
            booker_id: 2,
            status: "APPROVED".to_string(),
        }
    }

    /// Users 1 (ann) and 2 (bob)
    async fn users() -> Arc<dyn UserRepository> {
        let users = InMemoryUserRepository::new();
        for name in ["ann", "bob"] {
            users
                .create(CreateUser {
                    name: name.to_string(),
                    email: format!("{}@mail.com", name),
                })
                .await
                .unwrap();
        }
        Arc::new(users)
    }

    async fn service(
        repo: MockItemRepository,
        bookings: MockBookingHistory,
    ) -> ItemService<MockItemRepository> {
        ItemService::new(
            repo,
            users().await,
            Arc::new(InMemoryItemRequestRepository::new()),
            Arc::new(bookings),
        )
    }

    #[tokio::test]
    async fn test_create_with_unknown_owner() {
        let mut repo = MockItemRepository::new();
        repo.expect_create().never();

        let service = service(repo, MockBookingHistory::new()).await;
        let result = service
            .create_item(
                9,
                CreateItem {
                    name: "Drill".to_string(),
                    description: "Cordless".to_string(),
                    available: Some(true),
                    request_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(ItemError::UserNotFound(9))));
    }

    #[tokio::test]
    async fn test_create_with_unknown_request() {
        let mut repo = MockItemRepository::new();
        repo.expect_create().never();

        let service = service(repo, MockBookingHistory::new()).await;
        let result = service
            .create_item(
                1,
                CreateItem {
                    name: "Drill".to_string(),
                    description: "Cordless".to_string(),
                    available: Some(true),
                    request_id: Some(42),
                },
            )
            .await;

        assert!(matches!(result, Err(ItemError::RequestNotFound(42))));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let mut repo = MockItemRepository::new();
        repo.expect_get_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(drill(1))));
        repo.expect_update().never();

        let service = service(repo, MockBookingHistory::new()).await;
        let result = service.update_item(2, 1, UpdateItem::default()).await;

        assert!(matches!(
            result,
            Err(ItemError::AccessViolation {
                user_id: 2,
                item_id: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_update_checks_item_before_caller() {
        let mut repo = MockItemRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let service = service(repo, MockBookingHistory::new()).await;
        let result = service.update_item(99, 5, UpdateItem::default()).await;

        assert!(matches!(result, Err(ItemError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_blank_search_never_hits_repository() {
        let mut repo = MockItemRepository::new();
        repo.expect_search().never();

        let service = service(repo, MockBookingHistory::new()).await;
        assert!(service.search("  ", Page::default()).await.unwrap().is_empty());
        assert!(service.search("", Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_details_show_bookings_only_to_owner() {
        let mut repo = MockItemRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(Some(drill(1))));
        repo.expect_list_comments().returning(|_| Ok(vec![]));

        let mut bookings = MockBookingHistory::new();
        bookings
            .expect_last_booking()
            .with(eq(1), always())
            .times(1)
            .returning(|_, _| Ok(Some(snapshot(10))));
        bookings
            .expect_next_booking()
            .times(1)
            .returning(|_, _| Ok(None));

        let service = service(repo, bookings).await;

        let for_owner = service.get_item_details(1, 1).await.unwrap();
        assert_eq!(for_owner.last_booking, Some(snapshot(10)));
        assert_eq!(for_owner.next_booking, None);

        let for_other = service.get_item_details(2, 1).await.unwrap();
        assert_eq!(for_other.last_booking, None);
        assert_eq!(for_other.next_booking, None);
    }

    #[tokio::test]
    async fn test_comment_without_booking_is_rejected_before_text_check() {
        let mut repo = MockItemRepository::new();
        repo.expect_add_comment().never();

        let mut bookings = MockBookingHistory::new();
        bookings
            .expect_has_started_approved_booking()
            .returning(|_, _, _| Ok(false));

        let service = service(repo, bookings).await;
        let result = service
            .add_comment(2, 1, CreateComment { text: String::new() })
            .await;

        assert!(matches!(result, Err(ItemError::CommentAccessViolation)));
    }

    #[tokio::test]
    async fn test_blank_comment_is_rejected() {
        let mut bookings = MockBookingHistory::new();
        bookings
            .expect_has_started_approved_booking()
            .returning(|_, _, _| Ok(true));

        let service = service(MockItemRepository::new(), bookings).await;
        let result = service
            .add_comment(
                2,
                1,
                CreateComment {
                    text: " \n".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(ItemError::TextValidation)));
    }

    #[tokio::test]
    async fn test_comment_resolves_author_name() {
        let mut repo = MockItemRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(Some(drill(1))));
        repo.expect_add_comment()
            .with(eq(1), eq(2), eq("Works great".to_string()), always())
            .returning(|item_id, author_id, text, created| {
                Ok(CommentRecord {
                    id: 7,
                    text,
                    item_id,
                    author_id,
                    created,
                })
            });

        let mut bookings = MockBookingHistory::new();
        bookings
            .expect_has_started_approved_booking()
            .with(eq(2), eq(1), always())
            .returning(|_, _, _| Ok(true));

        let service = service(repo, bookings).await;
        let comment = service
            .add_comment(
                2,
                1,
                CreateComment {
                    text: "Works great".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(comment.id, 7);
        assert_eq!(comment.author_name, "bob");
    }
}
