use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        self.repository.list().await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        self.repository.create(input).await
    }

    #[instrument(skip(self, input), fields(user_id = %id))]
    pub async fn update_user(&self, id: i64, input: UpdateUser) -> UserResult<User> {
        self.repository
            .update(id, input)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use mockall::predicate::eq;

    fn ann() -> User {
        User {
            id: 1,
            name: "Ann".to_string(),
            email: "ann@mail.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_user_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(ann())));

        let service = UserService::new(mock_repo);
        assert_eq!(service.get_user(1).await.unwrap(), ann());
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        let result = service.get_user(9).await;
        assert!(matches!(result, Err(UserError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_update().returning(|_, _| Ok(None));

        let service = UserService::new(mock_repo);
        let result = service.update_user(3, UpdateUser::default()).await;
        assert!(matches!(result, Err(UserError::NotFound(3))));
    }

    #[tokio::test]
    async fn test_create_passes_conflict_through() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_create()
            .returning(|input| Err(UserError::EmailConflict(input.email)));

        let service = UserService::new(mock_repo);
        let result = service
            .create_user(CreateUser {
                name: "Ann".to_string(),
                email: "ann@mail.com".to_string(),
            })
            .await;
        assert!(matches!(result, Err(UserError::EmailConflict(e)) if e == "ann@mail.com"));
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_delete()
            .with(eq(5))
            .times(1)
            .returning(|_| Ok(false));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.delete_user(5).await,
            Err(UserError::NotFound(5))
        ));
    }
}
