//! Items Domain
//!
//! The item catalog and the comment board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /items endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      UserRepository          (owner / author / caller exist)
//! │ ItemService │ ───▶ ItemRequestRepository   (referenced request exists)
//! └──────┬──────┘      BookingHistory          (implemented by domain_bookings)
//!        │
//! ┌──────▼──────┐
//! │ItemRepository│ ← items + comments, PostgreSQL or in-memory
//! └─────────────┘
//! ```
//!
//! Both repositories also implement [`domain_requests::RequestedItems`], which
//! is how the request board sees the items listed against requests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_items::{handlers, InMemoryItemRepository, ItemService};
//!
//! let service = ItemService::new(InMemoryItemRepository::new(), users, requests, bookings);
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ItemError, ItemResult};
pub use models::{
    BookingSnapshot, Comment, CommentRecord, CreateComment, CreateItem, Item, ItemDetails,
    UpdateItem,
};
pub use postgres::PgItemRepository;
pub use repository::{BookingHistory, InMemoryItemRepository, ItemRepository};
pub use service::ItemService;
