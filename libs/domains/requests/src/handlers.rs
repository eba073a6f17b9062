use axum::{Json, Router, extract::State, routing::get};
use axum_helpers::{
    IdPath, Page, PageQuery, SharerId, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::RequestResult;
use crate::models::{CreateItemRequest, ItemRequest, ItemRequestDetails, RequestItem};
use crate::repository::ItemRequestRepository;
use crate::service::RequestService;

pub const TAG: &str = "requests";

/// OpenAPI documentation for the request board
#[derive(OpenApi)]
#[openapi(
    paths(create_request, list_own_requests, list_all_requests, get_request),
    components(
        schemas(ItemRequest, CreateItemRequest, ItemRequestDetails, RequestItem),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Requests for items not yet in the catalog")
    )
)]
pub struct ApiDoc;

pub fn router<R: ItemRequestRepository + 'static>(service: RequestService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_own_requests).post(create_request))
        .route("/all", get(list_all_requests))
        .route("/{id}", get(get_request))
        .with_state(shared_service)
}

/// Post a request for an item
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requestor id")
    ),
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Request created", body = ItemRequest),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_request<R: ItemRequestRepository>(
    State(service): State<Arc<RequestService<R>>>,
    SharerId(requestor_id): SharerId,
    ValidatedJson(input): ValidatedJson<CreateItemRequest>,
) -> RequestResult<Json<ItemRequest>> {
    let request = service.create_request(requestor_id, input).await?;
    Ok(Json(request))
}

/// The caller's own requests, newest first, each with its items
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requestor id")
    ),
    responses(
        (status = 200, description = "Own requests", body = Vec<ItemRequestDetails>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_own_requests<R: ItemRequestRepository>(
    State(service): State<Arc<RequestService<R>>>,
    SharerId(requestor_id): SharerId,
) -> RequestResult<Json<Vec<ItemRequestDetails>>> {
    let requests = service.list_own_requests(requestor_id).await?;
    Ok(Json(requests))
}

/// Everyone's requests not yet answered by other users, newest first
#[utoipa::path(
    get,
    path = "/all",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller id"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of requests", body = Vec<ItemRequestDetails>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_all_requests<R: ItemRequestRepository>(
    State(service): State<Arc<RequestService<R>>>,
    SharerId(caller_id): SharerId,
    page: Page,
) -> RequestResult<Json<Vec<ItemRequestDetails>>> {
    let requests = service.list_all_requests(caller_id, page).await?;
    Ok(Json(requests))
}

/// A request with the items listed against it
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller id"),
        ("id" = i64, Path, description = "Request id")
    ),
    responses(
        (status = 200, description = "Request found", body = ItemRequestDetails),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_request<R: ItemRequestRepository>(
    State(service): State<Arc<RequestService<R>>>,
    SharerId(caller_id): SharerId,
    IdPath(id): IdPath,
) -> RequestResult<Json<ItemRequestDetails>> {
    let request = service.get_request(caller_id, id).await?;
    Ok(Json(request))
}
