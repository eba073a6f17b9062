use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_items::{BookingHistory, BookingSnapshot, ItemResult};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{BookingError, BookingResult};
use crate::models::{Booking, BookingState, BookingStatus, BookingSubject, NewBooking};

/// Repository trait for bookings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Store a new booking in `WAITING`
    async fn create(&self, booking: NewBooking) -> BookingResult<Booking>;

    async fn get_by_id(&self, id: i64) -> BookingResult<Option<Booking>>;

    /// Move a `WAITING` booking to `status` as one compare-and-set.
    ///
    /// Fails with `NotFound` or, when the booking already left `WAITING`,
    /// with `InvalidState`.
    async fn set_status_if_waiting(&self, id: i64, status: BookingStatus)
    -> BookingResult<Booking>;

    /// Bookings of `subject` in `state` at `now`, descending by start
    async fn list(
        &self,
        subject: BookingSubject,
        state: BookingState,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> BookingResult<Vec<Booking>>;
}

#[derive(Debug, Default)]
struct State {
    bookings: BTreeMap<i64, Booking>,
    next_id: i64,
}

/// In-memory implementation of BookingRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryBookingRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-rejected bookings of one item
    async fn item_history(&self, item_id: i64) -> Vec<Booking> {
        let state = self.state.read().await;
        state
            .bookings
            .values()
            .filter(|b| b.item_id == item_id && b.status != BookingStatus::Rejected)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create(&self, booking: NewBooking) -> BookingResult<Booking> {
        let mut state = self.state.write().await;

        state.next_id += 1;
        let booking = Booking {
            id: state.next_id,
            start: booking.start,
            end: booking.end,
            item_id: booking.item_id,
            booker_id: booking.booker_id,
            status: BookingStatus::Waiting,
        };
        state.bookings.insert(booking.id, booking.clone());

        tracing::info!(
            booking_id = %booking.id,
            item_id = %booking.item_id,
            booker_id = %booking.booker_id,
            "Created booking"
        );
        Ok(booking)
    }

    async fn get_by_id(&self, id: i64) -> BookingResult<Option<Booking>> {
        let state = self.state.read().await;
        Ok(state.bookings.get(&id).cloned())
    }

    async fn set_status_if_waiting(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> BookingResult<Booking> {
        let mut state = self.state.write().await;

        let booking = state
            .bookings
            .get_mut(&id)
            .ok_or(BookingError::NotFound(id))?;
        if booking.status != BookingStatus::Waiting {
            return Err(BookingError::InvalidState(id));
        }
        booking.status = status;

        tracing::info!(booking_id = %id, status = %status, "Changed booking status");
        Ok(booking.clone())
    }

    async fn list(
        &self,
        subject: BookingSubject,
        state: BookingState,
        now: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> BookingResult<Vec<Booking>> {
        let guard = self.state.read().await;

        let mut bookings: Vec<Booking> = guard
            .bookings
            .values()
            .filter(|b| subject.covers(b) && state.matches(b, now))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (Reverse(b.start), Reverse(b.id)));

        Ok(bookings
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl BookingHistory for InMemoryBookingRepository {
    async fn last_booking(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<Option<BookingSnapshot>> {
        let history = self.item_history(item_id).await;
        Ok(history
            .iter()
            .filter(|b| b.start < now)
            .max_by_key(|b| (b.end, b.id))
            .map(Booking::snapshot))
    }

    async fn next_booking(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<Option<BookingSnapshot>> {
        let history = self.item_history(item_id).await;
        Ok(history
            .iter()
            .filter(|b| b.start > now)
            .min_by_key(|b| (b.start, b.id))
            .map(Booking::snapshot))
    }

    async fn has_started_approved_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ItemResult<bool> {
        let state = self.state.read().await;
        Ok(state.bookings.values().any(|b| {
            b.booker_id == booker_id
                && b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.start < now
        }))
    }
}
