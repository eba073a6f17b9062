//! Item Requests Domain
//!
//! Public asks for items that are not in the catalog yet. Items listed
//! against a request are owned by the items domain; this crate sees them
//! only through the [`RequestedItems`] port.
//!
//! ```text
//! Handlers → RequestService → ItemRequestRepository
//!                 │
//!                 ├── UserRepository   (requestor / caller must exist)
//!                 └── RequestedItems   (implemented by domain_items)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_requests::{handlers, InMemoryItemRequestRepository, RequestService};
//!
//! let service = RequestService::new(InMemoryItemRequestRepository::new(), users, items);
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{RequestError, RequestResult};
pub use models::{CreateItemRequest, ItemRequest, ItemRequestDetails, RequestItem};
pub use postgres::PgItemRequestRepository;
pub use repository::{InMemoryItemRequestRepository, ItemRequestRepository, RequestedItems};
pub use service::RequestService;
