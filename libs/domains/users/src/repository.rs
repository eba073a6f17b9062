use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, ascending by id
    async fn list(&self) -> UserResult<Vec<User>>;

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Fails with `EmailConflict` when the email is taken
    async fn create(&self, input: CreateUser) -> UserResult<User>;

    /// Patch a user in one read-modify-write step.
    ///
    /// Returns `None` when the user does not exist.
    async fn update(&self, id: i64, input: UpdateUser) -> UserResult<Option<User>>;

    /// Returns whether a user was removed
    async fn delete(&self, id: i64) -> UserResult<bool>;

    async fn exists(&self, id: i64) -> UserResult<bool>;
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> UserResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let mut state = self.state.write().await;

        if state.email_taken(&input.email, None) {
            return Err(UserError::EmailConflict(input.email));
        }

        state.next_id += 1;
        let user = User {
            id: state.next_id,
            name: input.name,
            email: input.email,
        };
        state.users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn update(&self, id: i64, input: UpdateUser) -> UserResult<Option<User>> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &input.email {
            if state.email_taken(email, Some(id)) {
                return Err(UserError::EmailConflict(email.clone()));
            }
        }

        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        user.apply_update(input);

        tracing::info!(user_id = %id, "Updated user");
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let mut state = self.state.write().await;

        if state.users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists(&self, id: i64) -> UserResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.contains_key(&id))
    }
}
