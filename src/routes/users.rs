use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::users::{BookingHistoryList, CreateUserRequest, UpdateUserRequest, UserList},
    error::AppResult,
    models::User,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/{id}/history", get(booking_history))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Create user", body = ApiResponse<User>),
        (status = 400, description = "Blank name or invalid email"),
        (status = 409, description = "Email already taken"),
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::create_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "List users", body = ApiResponse<UserList>),
    ),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Get user", body = ApiResponse<User>),
        (status = 404, description = "User not found"),
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::get_user(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<User>),
        (status = 400, description = "Blank name or invalid email"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already taken"),
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_user(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted user", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "User not found"),
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = user_service::delete_user(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/users/{id}/history",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Bookings made by the user, newest first", body = ApiResponse<BookingHistoryList>),
        (status = 404, description = "User not found"),
    ),
    tag = "Users"
)]
pub async fn booking_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingHistoryList>>> {
    let resp = user_service::booking_history(&state, id).await?;
    Ok(Json(resp))
}
