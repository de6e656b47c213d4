use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod bookings;
pub mod doc;
pub mod health;
pub mod items;
pub mod params;
pub mod requests;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/items", items::router())
        .nest("/bookings", bookings::router())
        .nest("/requests", requests::router())
}

/// Full application: health, resource routes, API docs and a JSON 404.
///
/// Transport layers (tracing, request ids, limits) are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
