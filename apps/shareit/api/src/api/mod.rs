use axum::{Router, routing::get};
use domain_bookings::{BookingRepository, PgBookingRepository};
use domain_items::{BookingHistory, ItemRepository, PgItemRepository};
use domain_requests::{ItemRequestRepository, PgItemRequestRepository, RequestedItems};
use domain_users::{PgUserRepository, UserRepository};
use std::sync::Arc;

use crate::state::{AppState, Storage};

pub mod bookings;
pub mod health;
pub mod items;
pub mod requests;
pub mod users;

/// Domain routes at the server root, over the configured backend.
///
/// Every service of one backend shares the same repositories, so cross-domain
/// reads see each other's writes.
pub fn routes(state: &AppState) -> Router {
    match &state.storage {
        Storage::Postgres(db) => compose(
            PgUserRepository::new(db.clone()),
            PgItemRequestRepository::new(db.clone()),
            PgItemRepository::new(db.clone()),
            PgBookingRepository::new(db.clone()),
        ),
        Storage::Memory(store) => compose(
            store.users.clone(),
            store.requests.clone(),
            store.items.clone(),
            store.bookings.clone(),
        ),
    }
}

fn compose<U, Q, I, B>(user_repo: U, request_repo: Q, item_repo: I, booking_repo: B) -> Router
where
    U: UserRepository + Clone + 'static,
    Q: ItemRequestRepository + Clone + 'static,
    I: ItemRepository + RequestedItems + Clone + 'static,
    B: BookingRepository + BookingHistory + Clone + 'static,
{
    Router::new()
        .nest("/users", users::router(user_repo.clone()))
        .nest(
            "/requests",
            requests::router(
                request_repo.clone(),
                Arc::new(user_repo.clone()),
                Arc::new(item_repo.clone()),
            ),
        )
        .nest(
            "/items",
            items::router(
                item_repo.clone(),
                Arc::new(user_repo.clone()),
                Arc::new(request_repo),
                Arc::new(booking_repo.clone()),
            ),
        )
        .nest(
            "/bookings",
            bookings::router(booking_repo, Arc::new(item_repo), Arc::new(user_repo)),
        )
}

/// `/ready`, checking the store behind the API
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
