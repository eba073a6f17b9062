use axum::Router;
use domain_requests::{ItemRequestRepository, RequestService, RequestedItems, handlers};
use domain_users::UserRepository;
use std::sync::Arc;

pub fn router<R: ItemRequestRepository + 'static>(
    repository: R,
    users: Arc<dyn UserRepository>,
    items: Arc<dyn RequestedItems>,
) -> Router {
    let service = RequestService::new(repository, users, items);
    handlers::router(service)
}
