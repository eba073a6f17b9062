//! Bookings Domain
//!
//! Reservations of an item by a booker for a time interval, and the
//! owner-driven approval workflow:
//!
//! ```text
//!            approve(true)
//!          ┌──────────────▶ APPROVED
//! WAITING ─┤
//!          └──────────────▶ REJECTED
//!            approve(false)
//! ```
//!
//! `CANCELED` is a valid stored status that no operation produces.
//!
//! Both repositories also implement [`domain_items::BookingHistory`], which
//! feeds the last/next booking projections and the comment permission check
//! of the item catalog.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_bookings::{handlers, BookingService, InMemoryBookingRepository};
//!
//! let service = BookingService::new(InMemoryBookingRepository::new(), items, users);
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{BookingError, BookingResult};
pub use models::{
    Booking, BookingDetails, BookingState, BookingStatus, BookingSubject, CreateBooking,
    NewBooking,
};
pub use postgres::PgBookingRepository;
pub use repository::{BookingRepository, InMemoryBookingRepository};
pub use service::BookingService;
