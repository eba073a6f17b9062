//! ShareIt API: item lending between users.
//!
//! The binary in `main.rs` loads [`config::Config`], connects the configured
//! store and serves [`app`]. Tests build the same router over
//! [`state::AppState::in_memory`].

use axum::Router;
use axum_helpers::server::{create_router, health_router};
use std::io;

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

use state::AppState;

/// Domain routes, API docs, middleware, `/health` and `/ready`
pub fn app(state: &AppState) -> io::Result<Router> {
    let router = create_router::<openapi::ApiDoc>(api::routes(state))?;

    Ok(router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone())))
}
