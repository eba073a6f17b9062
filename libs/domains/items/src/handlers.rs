use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, IdPath, Page, PageQuery, SharerId, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::{ItemError, ItemResult};
use crate::models::{
    BookingSnapshot, Comment, CreateComment, CreateItem, Item, ItemDetails, UpdateItem,
};
use crate::repository::ItemRepository;
use crate::service::ItemService;

pub const TAG: &str = "items";

/// OpenAPI documentation for Items API
#[derive(OpenApi)]
#[openapi(
    paths(list_items, search_items, get_item, create_item, update_item, add_comment),
    components(
        schemas(
            Item,
            ItemDetails,
            BookingSnapshot,
            Comment,
            CreateItem,
            UpdateItem,
            CreateComment
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Item catalog and comments")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matched against name and description, ignoring case
    pub text: Option<String>,
}

pub fn router<R: ItemRepository + 'static>(service: ItemService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/search", get(search_items))
        .route("/{id}", get(get_item).patch(update_item))
        .route("/{id}/comment", post(add_comment))
        .with_state(shared_service)
}

/// The caller's items, ascending by id, with bookings and comments
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner id"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of the owner's items", body = Vec<ItemDetails>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_items<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    SharerId(owner_id): SharerId,
    page: Page,
) -> ItemResult<Json<Vec<ItemDetails>>> {
    let items = service.list_owner_items(owner_id, page).await?;
    Ok(Json(items))
}

/// Search available items by text
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching available items", body = Vec<Item>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_items<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    page: Page,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Item>>, AppError> {
    let Query(query) = query?;
    let text = query.text.unwrap_or_default();
    let items = service.search(&text, page).await?;
    Ok(Json(items))
}

/// Item details; the owner also sees last and next booking
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller id"),
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item found", body = ItemDetails),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    SharerId(caller_id): SharerId,
    IdPath(id): IdPath,
) -> ItemResult<Json<ItemDetails>> {
    let item = service.get_item_details(caller_id, id).await?;
    Ok(Json(item))
}

/// List an item
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner id")
    ),
    request_body = CreateItem,
    responses(
        (status = 200, description = "Item created", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    SharerId(owner_id): SharerId,
    ValidatedJson(input): ValidatedJson<CreateItem>,
) -> ItemResult<Json<Item>> {
    let item = service.create_item(owner_id, input).await?;
    Ok(Json(item))
}

/// Patch an item; only its owner may
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller id"),
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    SharerId(caller_id): SharerId,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateItem>,
) -> ItemResult<Json<Item>> {
    let result = service.update_item(caller_id, id, input).await;

    AuditEvent::new(
        Some(caller_id),
        "item.update",
        Some(format!("item:{}", id)),
        update_outcome(&result),
    )
    .log();

    Ok(Json(result?))
}

fn update_outcome(result: &ItemResult<Item>) -> AuditOutcome {
    match result {
        Ok(_) => AuditOutcome::Success,
        Err(ItemError::AccessViolation { .. }) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    }
}

/// Comment on an item after an approved booking of it has started
#[utoipa::path(
    post,
    path = "/{id}/comment",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Author id"),
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = CreateComment,
    responses(
        (status = 200, description = "Comment added", body = Comment),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_comment<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    SharerId(author_id): SharerId,
    IdPath(item_id): IdPath,
    ValidatedJson(input): ValidatedJson<CreateComment>,
) -> ItemResult<Json<Comment>> {
    let comment = service.add_comment(author_id, item_id, input).await?;
    Ok(Json(comment))
}
