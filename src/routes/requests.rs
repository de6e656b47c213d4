use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::requests::{CreateItemRequestRequest, ItemRequestList},
    error::AppResult,
    middleware::sharer::SharerUser,
    models::ItemRequest,
    response::ApiResponse,
    routes::params::Pagination,
    services::request_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own_requests).post(create_request))
        .route("/all", get(list_other_requests))
        .route("/{id}", get(get_request))
}

#[utoipa::path(
    post,
    path = "/requests",
    params(("X-Sharer-User-Id" = Uuid, Header, description = "Requestor id")),
    request_body = CreateItemRequestRequest,
    responses(
        (status = 200, description = "Request created", body = ApiResponse<ItemRequest>),
        (status = 400, description = "Blank description"),
        (status = 404, description = "User not found"),
    ),
    tag = "Requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    user: SharerUser,
    Json(payload): Json<CreateItemRequestRequest>,
) -> AppResult<Json<ApiResponse<ItemRequest>>> {
    let resp = request_service::create_request(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/requests",
    params(("X-Sharer-User-Id" = Uuid, Header, description = "Requestor id")),
    responses(
        (status = 200, description = "Caller's requests with answering items", body = ApiResponse<ItemRequestList>),
        (status = 404, description = "User not found"),
    ),
    tag = "Requests"
)]
pub async fn list_own_requests(
    State(state): State<AppState>,
    user: SharerUser,
) -> AppResult<Json<ApiResponse<ItemRequestList>>> {
    let resp = request_service::list_own_requests(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/requests/all",
    params(
        ("X-Sharer-User-Id" = Uuid, Header, description = "Caller id"),
        Pagination,
    ),
    responses(
        (status = 200, description = "Other users' requests, newest first", body = ApiResponse<ItemRequestList>),
        (status = 400, description = "Bad paging"),
        (status = 404, description = "User not found"),
    ),
    tag = "Requests"
)]
pub async fn list_other_requests(
    State(state): State<AppState>,
    user: SharerUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ItemRequestList>>> {
    let resp = request_service::list_other_requests(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID"),
        ("X-Sharer-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    responses(
        (status = 200, description = "Request with answering items", body = ApiResponse<ItemRequest>),
        (status = 404, description = "User or request not found"),
    ),
    tag = "Requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    user: SharerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ItemRequest>>> {
    let resp = request_service::get_request(&state, &user, id).await?;
    Ok(Json(resp))
}
