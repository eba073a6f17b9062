//! # Axum Helpers
//!
//! Shared HTTP plumbing for the ShareIt API.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly with API docs, health checks, graceful shutdown
//! - **[`http`]**: Security headers and optional CORS
//! - **[`errors`]**: [`AppError`] and the `{"error": ...}` response body
//! - **[`extractors`]**: Caller identity header, numeric ids, paging, validated JSON
//! - **[`validators`]**: Field validators shared by request payloads
//! - **[`audit`]**: Audit records for security-relevant mutations
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(api_routes)?.merge(health_router(app_info!()));
//! create_production_app(router, &ServerConfig::default(), async {}).await?;
//! ```

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;
pub mod validators;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres,
    create_production_app, create_router, health_router, run_health_checks,
};

pub use http::{cors_layer_from_env, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{IdPath, Page, PageQuery, SHARER_HEADER, SharerId, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome};
