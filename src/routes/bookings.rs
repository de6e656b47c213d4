use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::bookings::{BookingList, CreateBookingRequest},
    error::AppResult,
    middleware::sharer::SharerUser,
    models::Booking,
    response::ApiResponse,
    routes::params::{BookingListQuery, DecisionQuery},
    services::booking_service::{self, BookingRole},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_booker_bookings).post(create_booking))
        .route("/owner", get(list_owner_bookings))
        .route("/{id}", get(get_booking).patch(decide_booking))
}

#[utoipa::path(
    post,
    path = "/bookings",
    params(("X-Sharer-User-Id" = Uuid, Header, description = "Booker id")),
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking request created in WAITING", body = ApiResponse<Booking>),
        (status = 400, description = "Bad dates or item not available"),
        (status = 403, description = "Owner tried to book own item"),
        (status = 404, description = "User or item not found"),
    ),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: SharerUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::create_booking(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = Uuid, Header, description = "Item owner id"),
        DecisionQuery,
    ),
    responses(
        (status = 200, description = "Booking approved or rejected", body = ApiResponse<Booking>),
        (status = 400, description = "Booking already decided"),
        (status = 403, description = "Caller does not own the item"),
        (status = 404, description = "Booking not found"),
    ),
    tag = "Bookings"
)]
pub async fn decide_booking(
    State(state): State<AppState>,
    user: SharerUser,
    Path(id): Path<Uuid>,
    Query(decision): Query<DecisionQuery>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::decide_booking(&state, &user, id, decision.approved).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = Uuid, Header, description = "Booker or item owner id"),
    ),
    responses(
        (status = 200, description = "Booking", body = ApiResponse<Booking>),
        (status = 403, description = "Caller is neither booker nor owner"),
        (status = 404, description = "Booking not found"),
    ),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: SharerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::get_booking(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/bookings",
    params(
        ("X-Sharer-User-Id" = Uuid, Header, description = "Booker id"),
        BookingListQuery,
    ),
    responses(
        (status = 200, description = "Bookings made by the caller", body = ApiResponse<BookingList>),
        (status = 400, description = "Unknown state or bad paging"),
        (status = 404, description = "User not found"),
    ),
    tag = "Bookings"
)]
pub async fn list_booker_bookings(
    State(state): State<AppState>,
    user: SharerUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_bookings(
        &state,
        &user,
        BookingRole::Booker,
        query.state.as_deref(),
        query.pagination(),
    )
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/bookings/owner",
    params(
        ("X-Sharer-User-Id" = Uuid, Header, description = "Owner id"),
        BookingListQuery,
    ),
    responses(
        (status = 200, description = "Bookings of the caller's items", body = ApiResponse<BookingList>),
        (status = 400, description = "Unknown state or bad paging"),
        (status = 404, description = "User not found"),
    ),
    tag = "Bookings"
)]
pub async fn list_owner_bookings(
    State(state): State<AppState>,
    user: SharerUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_bookings(
        &state,
        &user,
        BookingRole::Owner,
        query.state.as_deref(),
        query.pagination(),
    )
    .await?;
    Ok(Json(resp))
}
