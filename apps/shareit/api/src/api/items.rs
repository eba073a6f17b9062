use axum::Router;
use domain_items::{BookingHistory, ItemRepository, ItemService, handlers};
use domain_requests::ItemRequestRepository;
use domain_users::UserRepository;
use std::sync::Arc;

pub fn router<R: ItemRepository + 'static>(
    repository: R,
    users: Arc<dyn UserRepository>,
    requests: Arc<dyn ItemRequestRepository>,
    bookings: Arc<dyn BookingHistory>,
) -> Router {
    let service = ItemService::new(repository, users, requests, bookings);
    handlers::router(service)
}
