use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    audit::{AuditEvent, record},
    dto::items::{
        CreateCommentRequest, CreateItemRequest, ItemDetails, ItemDetailsList, ItemList,
        UpdateItemRequest,
    },
    entity::{
        bookings::{Column as BookingCol, Entity as Bookings},
        comments::{ActiveModel as CommentActive, Column as CommentCol, Entity as Comments},
        item_requests::Entity as ItemRequests,
        items::{ActiveModel as ItemActive, Column as ItemCol, Entity as Items, Model as ItemModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::sharer::SharerUser,
    models::{BookingShort, BookingStatus, Comment, Item},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        booking_rules::last_and_next,
        convert::{booking_short_from_entity, booking_status, comment_from_entity, item_from_entity},
        user_service::{ensure_user_exists, find_user},
    },
    state::AppState,
    validation,
};

pub async fn find_item(state: &AppState, id: Uuid) -> AppResult<ItemModel> {
    Items::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {id} does not exist")))
}

pub async fn create_item(
    state: &AppState,
    user: &SharerUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    let name = validation::required_text("name", payload.name)?;
    let description = validation::required_text("description", payload.description)?;
    let available = payload
        .available
        .ok_or_else(|| AppError::bad_request("available must be set"))?;

    ensure_user_exists(state, user.user_id).await?;
    if let Some(request_id) = payload.request_id {
        if ItemRequests::find_by_id(request_id)
            .count(&state.orm)
            .await?
            == 0
        {
            return Err(AppError::not_found(format!(
                "Request {request_id} does not exist"
            )));
        }
    }

    let item = ItemActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        request_id: Set(payload.request_id),
        name: Set(name),
        description: Set(description),
        available: Set(available),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    tracing::info!(item_id = %item.id, owner_id = %user.user_id, "item created");

    record(
        &state.pool,
        AuditEvent::new(
            user.user_id,
            "item_create",
            "items",
            serde_json::json!({ "item_id": item.id, "request_id": item.request_id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Item created",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &SharerUser,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    let existing = find_item(state, id).await?;
    if existing.owner_id != user.user_id {
        return Err(AppError::forbidden("Only the owner can update this item"));
    }

    let name = validation::optional_text("name", payload.name)?;
    let description = validation::optional_text("description", payload.description)?;

    let mut active: ItemActive = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(available) = payload.available {
        active.available = Set(available);
    }
    let item = active.update(&state.orm).await?;
    tracing::info!(item_id = %item.id, "item updated");

    record(
        &state.pool,
        AuditEvent::new(
            user.user_id,
            "item_update",
            "items",
            serde_json::json!({ "item_id": item.id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn get_item(
    state: &AppState,
    user: &SharerUser,
    id: Uuid,
) -> AppResult<ApiResponse<ItemDetails>> {
    let item = find_item(state, id).await?;
    let mut comments = load_comments(state, &[item.id]).await?;
    let comments = comments.remove(&item.id).unwrap_or_default();

    let (last, next) = if item.owner_id == user.user_id {
        let bookings = load_live_bookings(state, &[item.id]).await?;
        bookings
            .get(&item.id)
            .map(|slots| last_and_next(slots, Utc::now()))
            .unwrap_or((None, None))
    } else {
        (None, None)
    };

    Ok(ApiResponse::success(
        "Item",
        ItemDetails::new(item_from_entity(item), last, next, comments),
        None,
    ))
}

pub async fn list_owner_items(
    state: &AppState,
    user: &SharerUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ItemDetailsList>> {
    let page = pagination.normalize()?;
    ensure_user_exists(state, user.user_id).await?;

    let finder = Items::find()
        .filter(ItemCol::OwnerId.eq(user.user_id))
        .order_by_asc(ItemCol::CreatedAt)
        .order_by_asc(ItemCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(page.size as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let bookings = load_live_bookings(state, &ids).await?;
    let mut comments = load_comments(state, &ids).await?;
    let now = Utc::now();

    let items = items
        .into_iter()
        .map(|item| {
            let (last, next) = bookings
                .get(&item.id)
                .map(|slots| last_and_next(slots, now))
                .unwrap_or((None, None));
            let item_comments = comments.remove(&item.id).unwrap_or_default();
            ItemDetails::new(item_from_entity(item), last, next, item_comments)
        })
        .collect();

    Ok(ApiResponse::success(
        "Items",
        ItemDetailsList { items },
        Some(Meta::page(&page, total)),
    ))
}

pub async fn search_items(
    state: &AppState,
    text: Option<String>,
    pagination: Pagination,
) -> AppResult<ApiResponse<ItemList>> {
    let page = pagination.normalize()?;
    let text = match text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            return Ok(ApiResponse::success(
                "Items",
                ItemList { items: Vec::new() },
                Some(Meta::page(&page, 0)),
            ));
        }
    };
    tracing::debug!(text = %text, "searching items");

    let pattern = format!("%{}%", escape_like(&text));
    let condition = Condition::all().add(ItemCol::Available.eq(true)).add(
        Condition::any()
            .add(Expr::col(ItemCol::Name).ilike(pattern.clone()))
            .add(Expr::col(ItemCol::Description).ilike(pattern)),
    );

    let finder = Items::find()
        .filter(condition)
        .order_by_asc(ItemCol::CreatedAt)
        .order_by_asc(ItemCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(page.size as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Items",
        ItemList { items },
        Some(Meta::page(&page, total)),
    ))
}

pub async fn add_comment(
    state: &AppState,
    user: &SharerUser,
    item_id: Uuid,
    payload: CreateCommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    let text = validation::required_text("text", payload.text)?;
    let author = find_user(state, user.user_id).await?;
    let item = find_item(state, item_id).await?;

    let now = Utc::now();
    let finished = Bookings::find()
        .filter(
            Condition::all()
                .add(BookingCol::ItemId.eq(item.id))
                .add(BookingCol::BookerId.eq(author.id))
                .add(BookingCol::Status.eq(BookingStatus::Approved.as_str()))
                .add(BookingCol::EndDate.lt(now.fixed_offset())),
        )
        .count(&state.orm)
        .await?;
    if finished == 0 {
        return Err(AppError::bad_request(format!(
            "User has no completed booking of item {item_id}"
        )));
    }

    let comment = CommentActive {
        id: Set(Uuid::new_v4()),
        text: Set(text),
        item_id: Set(item.id),
        author_id: Set(author.id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    tracing::info!(comment_id = %comment.id, item_id = %item.id, author_id = %author.id, "comment added");

    record(
        &state.pool,
        AuditEvent::new(
            author.id,
            "comment_create",
            "comments",
            serde_json::json!({ "comment_id": comment.id, "item_id": item.id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Comment added",
        comment_from_entity(comment, author.name),
        Some(Meta::empty()),
    ))
}

/// Comments per item, oldest first, with author names resolved.
async fn load_comments(
    state: &AppState,
    item_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Comment>>> {
    let mut grouped: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    if item_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = Comments::find()
        .filter(CommentCol::ItemId.is_in(item_ids.iter().copied()))
        .order_by_asc(CommentCol::CreatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?;

    for (comment, author) in rows {
        let author_name = author.map(|a| a.name).unwrap_or_default();
        grouped
            .entry(comment.item_id)
            .or_default()
            .push(comment_from_entity(comment, author_name));
    }
    Ok(grouped)
}

/// Bookings per item that still hold it (waiting or approved).
async fn load_live_bookings(
    state: &AppState,
    item_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<(BookingShort, BookingStatus)>>> {
    let mut grouped: HashMap<Uuid, Vec<(BookingShort, BookingStatus)>> = HashMap::new();
    if item_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = Bookings::find()
        .filter(BookingCol::ItemId.is_in(item_ids.iter().copied()))
        .filter(BookingCol::Status.is_in([
            BookingStatus::Waiting.as_str(),
            BookingStatus::Approved.as_str(),
        ]))
        .all(&state.orm)
        .await?;

    for row in rows {
        let status = booking_status(&row)?;
        grouped
            .entry(row.item_id)
            .or_default()
            .push((booking_short_from_entity(&row), status));
    }
    Ok(grouped)
}

/// Escapes LIKE wildcards so user text is matched literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("drill"), "drill");
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
