use axum_helpers::Page;
use chrono::Utc;
use domain_items::{Item, ItemRepository};
use domain_users::UserRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{BookingError, BookingResult};
use crate::models::{
    BookedItem, Booker, Booking, BookingDetails, BookingState, BookingStatus, BookingSubject,
    NewBooking,
};
use crate::repository::BookingRepository;

/// Service layer for the booking workflow
#[derive(Clone)]
pub struct BookingService<R: BookingRepository> {
    repository: Arc<R>,
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(
        repository: R,
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            items,
            users,
        }
    }

    async fn ensure_user(&self, user_id: i64) -> BookingResult<()> {
        if self.users.exists(user_id).await? {
            Ok(())
        } else {
            Err(BookingError::UserNotFound(user_id))
        }
    }

    async fn find_item(&self, item_id: i64) -> BookingResult<Item> {
        self.items
            .get_by_id(item_id)
            .await?
            .ok_or(BookingError::ItemNotFound(item_id))
    }

    async fn find_booking(&self, booking_id: i64) -> BookingResult<Booking> {
        self.repository
            .get_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))
    }

    /// Resolve item and booker names for one booking
    async fn render(&self, booking: Booking, item: &Item) -> BookingResult<BookingDetails> {
        let booker = self
            .users
            .get_by_id(booking.booker_id)
            .await?
            .ok_or(BookingError::UserNotFound(booking.booker_id))?;

        Ok(details(
            booking,
            BookedItem {
                id: item.id,
                name: item.name.clone(),
            },
            Booker {
                id: booker.id,
                name: booker.name,
            },
        ))
    }

    /// Render a listing with cached lookups; bookings whose item or booker no
    /// longer exists drop out
    async fn render_all(&self, bookings: Vec<Booking>) -> BookingResult<Vec<BookingDetails>> {
        let mut items: HashMap<i64, Option<BookedItem>> = HashMap::new();
        let mut bookers: HashMap<i64, Option<Booker>> = HashMap::new();
        let mut result = Vec::with_capacity(bookings.len());

        for booking in bookings {
            if !items.contains_key(&booking.item_id) {
                let item = self.items.get_by_id(booking.item_id).await?;
                items.insert(
                    booking.item_id,
                    item.map(|i| BookedItem {
                        id: i.id,
                        name: i.name,
                    }),
                );
            }
            if !bookers.contains_key(&booking.booker_id) {
                let user = self.users.get_by_id(booking.booker_id).await?;
                bookers.insert(
                    booking.booker_id,
                    user.map(|u| Booker {
                        id: u.id,
                        name: u.name,
                    }),
                );
            }

            let item = items.get(&booking.item_id).cloned().flatten();
            let booker = bookers.get(&booking.booker_id).cloned().flatten();
            if let (Some(item), Some(booker)) = (item, booker) {
                result.push(details(booking, item, booker));
            }
        }
        Ok(result)
    }

    #[instrument(skip(self, booking), fields(item_id = %booking.item_id, booker_id = %booking.booker_id))]
    pub async fn create_booking(&self, booking: NewBooking) -> BookingResult<BookingDetails> {
        let item = self.find_item(booking.item_id).await?;
        self.ensure_user(booking.booker_id).await?;

        if !item.available {
            return Err(BookingError::ItemUnavailable(item.id));
        }
        if item.owner == booking.booker_id {
            return Err(BookingError::SelfBooking);
        }
        let now = Utc::now();
        if booking.start >= booking.end || booking.start <= now || booking.end <= now {
            return Err(BookingError::IntervalInvalid {
                start: booking.start,
                end: booking.end,
            });
        }

        let created = self.repository.create(booking).await?;
        self.render(created, &item).await
    }

    /// Owner decision on a waiting booking
    #[instrument(skip(self), fields(booking_id = %booking_id, caller_id = %caller_id))]
    pub async fn approve(
        &self,
        caller_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> BookingResult<BookingDetails> {
        let booking = self.find_booking(booking_id).await?;
        let item = self.find_item(booking.item_id).await?;

        if item.owner != caller_id {
            return Err(BookingError::OwnerOnly);
        }
        if booking.status != BookingStatus::Waiting {
            return Err(BookingError::InvalidState(booking_id));
        }

        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        let updated = self
            .repository
            .set_status_if_waiting(booking_id, status)
            .await?;
        self.render(updated, &item).await
    }

    /// Readable by the booker and the item owner only
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn get_booking(
        &self,
        caller_id: i64,
        booking_id: i64,
    ) -> BookingResult<BookingDetails> {
        let booking = self.find_booking(booking_id).await?;
        let item = self.find_item(booking.item_id).await?;

        if booking.booker_id != caller_id && item.owner != caller_id {
            return Err(BookingError::AccessDenied);
        }
        self.render(booking, &item).await
    }

    #[instrument(skip(self))]
    pub async fn list_for_booker(
        &self,
        booker_id: i64,
        state: Option<&str>,
        page: Page,
    ) -> BookingResult<Vec<BookingDetails>> {
        let state = BookingState::parse(state).map_err(BookingError::UnknownState)?;
        self.ensure_user(booker_id).await?;

        let bookings = self
            .repository
            .list(
                BookingSubject::Booker(booker_id),
                state,
                Utc::now(),
                page.from,
                page.size,
            )
            .await?;
        self.render_all(bookings).await
    }

    /// Bookings of every item the owner lists
    #[instrument(skip(self))]
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        state: Option<&str>,
        page: Page,
    ) -> BookingResult<Vec<BookingDetails>> {
        let state = BookingState::parse(state).map_err(BookingError::UnknownState)?;
        self.ensure_user(owner_id).await?;

        let item_ids = self.items.ids_by_owner(owner_id).await?;
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let bookings = self
            .repository
            .list(
                BookingSubject::Items(item_ids),
                state,
                Utc::now(),
                page.from,
                page.size,
            )
            .await?;
        self.render_all(bookings).await
    }
}

fn details(booking: Booking, item: BookedItem, booker: Booker) -> BookingDetails {
    BookingDetails {
        id: booking.id,
        start: booking.start,
        end: booking.end,
        status: booking.status,
        item,
        booker,
    }
}
