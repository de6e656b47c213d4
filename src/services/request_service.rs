use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::{AuditEvent, record},
    dto::requests::{CreateItemRequestRequest, ItemRequestList},
    entity::{
        item_requests::{
            ActiveModel as RequestActive, Column as RequestCol, Entity as ItemRequests,
            Model as RequestModel,
        },
        items::{Column as ItemCol, Entity as Items},
    },
    error::{AppError, AppResult},
    middleware::sharer::SharerUser,
    models::{Item, ItemRequest},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        convert::{item_from_entity, request_from_entity},
        user_service::ensure_user_exists,
    },
    state::AppState,
    validation,
};

pub async fn create_request(
    state: &AppState,
    user: &SharerUser,
    payload: CreateItemRequestRequest,
) -> AppResult<ApiResponse<ItemRequest>> {
    let description = validation::required_text("description", payload.description)?;
    ensure_user_exists(state, user.user_id).await?;

    let request = RequestActive {
        id: Set(Uuid::new_v4()),
        description: Set(description),
        requestor_id: Set(user.user_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    tracing::info!(request_id = %request.id, requestor_id = %user.user_id, "item request created");

    record(
        &state.pool,
        AuditEvent::new(
            user.user_id,
            "request_create",
            "item_requests",
            serde_json::json!({ "request_id": request.id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Request created",
        request_from_entity(request, Vec::new()),
        Some(Meta::empty()),
    ))
}

pub async fn list_own_requests(
    state: &AppState,
    user: &SharerUser,
) -> AppResult<ApiResponse<ItemRequestList>> {
    ensure_user_exists(state, user.user_id).await?;

    let requests = ItemRequests::find()
        .filter(RequestCol::RequestorId.eq(user.user_id))
        .order_by_asc(RequestCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let total = requests.len() as i64;
    let items = with_items(state, requests).await?;

    Ok(ApiResponse::success(
        "Requests",
        ItemRequestList { items },
        Some(Meta::whole(total)),
    ))
}

pub async fn get_request(
    state: &AppState,
    user: &SharerUser,
    id: Uuid,
) -> AppResult<ApiResponse<ItemRequest>> {
    ensure_user_exists(state, user.user_id).await?;
    let request = ItemRequests::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Request {id} does not exist")))?;

    let mut found = with_items(state, vec![request]).await?;
    let request = found
        .pop()
        .ok_or_else(|| AppError::not_found(format!("Request {id} does not exist")))?;
    Ok(ApiResponse::success("Request", request, None))
}

pub async fn list_other_requests(
    state: &AppState,
    user: &SharerUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ItemRequestList>> {
    let page = pagination.normalize()?;
    ensure_user_exists(state, user.user_id).await?;

    let finder = ItemRequests::find()
        .filter(RequestCol::RequestorId.ne(user.user_id))
        .order_by_desc(RequestCol::CreatedAt)
        .order_by_asc(RequestCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;
    let requests = finder
        .limit(page.size as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_items(state, requests).await?;

    Ok(ApiResponse::success(
        "Requests",
        ItemRequestList { items },
        Some(Meta::page(&page, total)),
    ))
}

/// Attaches the items created in answer to each request, keeping request order.
async fn with_items(state: &AppState, requests: Vec<RequestModel>) -> AppResult<Vec<ItemRequest>> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
    let mut by_request: HashMap<Uuid, Vec<Item>> = HashMap::new();
    let answers = Items::find()
        .filter(ItemCol::RequestId.is_in(ids))
        .order_by_asc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?;
    for item in answers {
        if let Some(request_id) = item.request_id {
            by_request
                .entry(request_id)
                .or_default()
                .push(item_from_entity(item));
        }
    }

    Ok(requests
        .into_iter()
        .map(|request| {
            let items = by_request.remove(&request.id).unwrap_or_default();
            request_from_entity(request, items)
        })
        .collect())
}
