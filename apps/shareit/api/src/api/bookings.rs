use axum::Router;
use domain_bookings::{BookingRepository, BookingService, handlers};
use domain_items::ItemRepository;
use domain_users::UserRepository;
use std::sync::Arc;

pub fn router<R: BookingRepository + 'static>(
    repository: R,
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
) -> Router {
    let service = BookingService::new(repository, items, users);
    handlers::router(service)
}
