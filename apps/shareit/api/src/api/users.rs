use axum::Router;
use domain_users::{UserRepository, UserService, handlers};

pub fn router<R: UserRepository + 'static>(repository: R) -> Router {
    let service = UserService::new(repository);
    handlers::router(service)
}
