use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, IdPath, Page, PageQuery, SharerId, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{BookingError, BookingResult};
use crate::models::{
    ApprovalQuery, BookedItem, Booker, BookingDetails, BookingStatus, CreateBooking, StateQuery,
};
use crate::repository::BookingRepository;
use crate::service::BookingService;

pub const TAG: &str = "bookings";

/// OpenAPI documentation for Bookings API
#[derive(OpenApi)]
#[openapi(
    paths(create_booking, approve_booking, get_booking, list_booker_bookings, list_owner_bookings),
    components(
        schemas(BookingDetails, BookingStatus, BookedItem, Booker, CreateBooking),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Booking requests and owner approval")
    )
)]
pub struct ApiDoc;

pub fn router<R: BookingRepository + 'static>(service: BookingService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_booker_bookings).post(create_booking))
        .route("/owner", get(list_owner_bookings))
        .route("/{id}", get(get_booking).patch(approve_booking))
        .with_state(shared_service)
}

/// Book an item for an interval
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker id")
    ),
    request_body = CreateBooking,
    responses(
        (status = 200, description = "Booking created in WAITING", body = BookingDetails),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    SharerId(booker_id): SharerId,
    ValidatedJson(input): ValidatedJson<CreateBooking>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = input
        .into_new(booker_id)
        .ok_or_else(|| AppError::BadRequest("itemId, start and end are required".to_string()))?;

    let details = service.create_booking(booking).await?;
    Ok(Json(details))
}

/// Approve or reject a waiting booking; only the item owner may
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner id"),
        ("id" = i64, Path, description = "Booking id"),
        ApprovalQuery
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingDetails),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn approve_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    SharerId(caller_id): SharerId,
    IdPath(id): IdPath,
    query: Result<Query<ApprovalQuery>, QueryRejection>,
) -> Result<Json<BookingDetails>, AppError> {
    let Query(query) = query?;
    let result = service.approve(caller_id, id, query.approved).await;

    let outcome = match &result {
        Ok(_) => AuditOutcome::Success,
        Err(BookingError::OwnerOnly) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    };
    AuditEvent::new(
        Some(caller_id),
        "booking.approve",
        Some(format!("booking:{}", id)),
        outcome,
    )
    .with_details(serde_json::json!({ "approved": query.approved }))
    .log();

    Ok(Json(result?))
}

/// A booking, visible to its booker and the item owner
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller id"),
        ("id" = i64, Path, description = "Booking id")
    ),
    responses(
        (status = 200, description = "Booking found", body = BookingDetails),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    SharerId(caller_id): SharerId,
    IdPath(id): IdPath,
) -> BookingResult<Json<BookingDetails>> {
    let booking = service.get_booking(caller_id, id).await?;
    Ok(Json(booking))
}

/// The caller's own bookings, newest start first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker id"),
        StateQuery,
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of bookings", body = Vec<BookingDetails>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_booker_bookings<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    SharerId(booker_id): SharerId,
    page: Page,
    query: Result<Query<StateQuery>, QueryRejection>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let Query(query) = query?;
    let bookings = service
        .list_for_booker(booker_id, query.state.as_deref(), page)
        .await?;
    Ok(Json(bookings))
}

/// Bookings of the caller's items, newest start first
#[utoipa::path(
    get,
    path = "/owner",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner id"),
        StateQuery,
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of bookings", body = Vec<BookingDetails>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_owner_bookings<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    SharerId(owner_id): SharerId,
    page: Page,
    query: Result<Query<StateQuery>, QueryRejection>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let Query(query) = query?;
    let bookings = service
        .list_for_owner(owner_id, query.state.as_deref(), page)
        .await?;
    Ok(Json(bookings))
}
