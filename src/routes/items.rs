use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::items::{
        CreateCommentRequest, CreateItemRequest, ItemDetails, ItemDetailsList, ItemList,
        UpdateItemRequest,
    },
    error::AppResult,
    middleware::sharer::SharerUser,
    models::{Comment, Item},
    response::ApiResponse,
    routes::params::{Pagination, SearchQuery},
    services::item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_owner_items).post(create_item))
        .route("/search", get(search_items))
        .route("/{id}", get(get_item).patch(update_item))
        .route("/{id}/comment", post(add_comment))
}

#[utoipa::path(
    post,
    path = "/items",
    params(("X-Sharer-User-Id" = Uuid, Header, description = "Caller id")),
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Create item", body = ApiResponse<Item>),
        (status = 400, description = "Missing name, description or availability"),
        (status = 404, description = "Owner or request not found"),
    ),
    tag = "Items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: SharerUser,
    Json(payload): Json<CreateItemRequest>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let resp = item_service::create_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ApiResponse<Item>),
        (status = 403, description = "Caller does not own the item"),
        (status = 404, description = "Item not found"),
    ),
    tag = "Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: SharerUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let resp = item_service::update_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    responses(
        (status = 200, description = "Item with comments; bookings shown to the owner", body = ApiResponse<ItemDetails>),
        (status = 404, description = "Item not found"),
    ),
    tag = "Items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    user: SharerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ItemDetails>>> {
    let resp = item_service::get_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/items",
    params(
        ("X-Sharer-User-Id" = Uuid, Header, description = "Caller id"),
        Pagination,
    ),
    responses(
        (status = 200, description = "Items owned by the caller", body = ApiResponse<ItemDetailsList>),
        (status = 404, description = "User not found"),
    ),
    tag = "Items"
)]
pub async fn list_owner_items(
    State(state): State<AppState>,
    user: SharerUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ItemDetailsList>>> {
    let resp = item_service::list_owner_items(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/items/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Available items matching the text", body = ApiResponse<ItemList>),
    ),
    tag = "Items"
)]
pub async fn search_items(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ItemList>>> {
    let pagination = query.pagination();
    let resp = item_service::search_items(&state, query.text, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    params(
        ("id" = Uuid, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment added", body = ApiResponse<Comment>),
        (status = 400, description = "Blank text or no finished booking"),
        (status = 404, description = "User or item not found"),
    ),
    tag = "Items"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    user: SharerUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let resp = item_service::add_comment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
