//! Shared application state.
//!
//! Cloning is cheap: the PostgreSQL pool and the in-memory repositories are
//! reference counted.

use database::postgres::DatabaseConnection;
use domain_bookings::InMemoryBookingRepository;
use domain_items::InMemoryItemRepository;
use domain_requests::InMemoryItemRequestRepository;
use domain_users::InMemoryUserRepository;

use crate::config::Config;

/// One set of in-memory repositories shared by every service
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub users: InMemoryUserRepository,
    pub requests: InMemoryItemRequestRepository,
    pub items: InMemoryItemRepository,
    pub bookings: InMemoryBookingRepository,
}

#[derive(Clone)]
pub enum Storage {
    Postgres(DatabaseConnection),
    Memory(MemoryStore),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
}

impl AppState {
    pub fn postgres(config: Config, db: DatabaseConnection) -> Self {
        Self {
            config,
            storage: Storage::Postgres(db),
        }
    }

    pub fn in_memory(config: Config) -> Self {
        Self {
            config,
            storage: Storage::Memory(MemoryStore::default()),
        }
    }

    /// The pool, when running on PostgreSQL
    pub fn db(&self) -> Option<&DatabaseConnection> {
        match &self.storage {
            Storage::Postgres(db) => Some(db),
            Storage::Memory(_) => None,
        }
    }
}
