use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit::{AuditEvent, record},
    dto::bookings::{BookingList, CreateBookingRequest},
    entity::{
        bookings::{
            ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings,
            Model as BookingModel,
        },
        items::{Column as ItemCol, Entity as Items},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::sharer::SharerUser,
    models::{Booking, BookingStatus, Item, User},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        booking_rules,
        convert::{booking_status, item_from_entity, user_from_entity},
        user_service::{ensure_user_exists, find_user},
    },
    state::AppState,
};

/// Whose bookings a listing is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingRole {
    Booker,
    Owner,
}

pub async fn create_booking(
    state: &AppState,
    user: &SharerUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let item_id = payload
        .item_id
        .ok_or_else(|| AppError::bad_request("item_id must be set"))?;
    let (start, end) = match (payload.start, payload.end) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(AppError::bad_request("start and end must be set")),
    };
    booking_rules::check_window(start, end, Utc::now())?;

    tracing::info!(booker_id = %user.user_id, item_id = %item_id, "creating booking");
    let booker = find_user(state, user.user_id).await?;

    let txn = state.orm.begin().await?;
    // Share lock keeps the item's availability stable until the booking is stored.
    let item = Items::find_by_id(item_id)
        .lock(LockType::Share)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {item_id} does not exist")))?;
    booking_rules::check_bookable(booker.id, item.owner_id, item.available)?;

    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        item_id: Set(item.id),
        booker_id: Set(booker.id),
        start_date: Set(start.fixed_offset()),
        end_date: Set(end.fixed_offset()),
        status: Set(BookingStatus::Waiting.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    record(
        &state.pool,
        AuditEvent::new(
            booker.id,
            "booking_create",
            "bookings",
            serde_json::json!({ "booking_id": booking.id, "item_id": item.id }),
        ),
    )
    .await;

    let view = booking_view(booking, user_from_entity(booker), item_from_entity(item))?;
    Ok(ApiResponse::success(
        "Booking created",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn decide_booking(
    state: &AppState,
    user: &SharerUser,
    id: Uuid,
    approved: bool,
) -> AppResult<ApiResponse<Booking>> {
    let txn = state.orm.begin().await?;

    let booking = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {id} does not exist")))?;
    let item = Items::find_by_id(booking.item_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {} does not exist", booking.item_id)))?;

    let current = booking_status(&booking)?;
    let next = booking_rules::decide(user.user_id, item.owner_id, current, approved)?;

    let mut active: BookingActive = booking.into();
    active.status = Set(next.as_str().to_string());
    let booking = active.update(&txn).await?;

    let booker = Users::find_by_id(booking.booker_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} does not exist", booking.booker_id)))?;

    txn.commit().await?;
    tracing::info!(booking_id = %booking.id, status = %next, "booking decided");

    record(
        &state.pool,
        AuditEvent::new(
            user.user_id,
            "booking_decide",
            "bookings",
            serde_json::json!({ "booking_id": booking.id, "status": next.as_str() }),
        ),
    )
    .await;

    let view = booking_view(booking, user_from_entity(booker), item_from_entity(item))?;
    Ok(ApiResponse::success(
        "Booking updated",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn get_booking(
    state: &AppState,
    user: &SharerUser,
    id: Uuid,
) -> AppResult<ApiResponse<Booking>> {
    let booking = Bookings::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {id} does not exist")))?;
    let item = Items::find_by_id(booking.item_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {} does not exist", booking.item_id)))?;

    booking_rules::check_visible(user.user_id, booking.booker_id, item.owner_id)?;

    let booker = find_user(state, booking.booker_id).await?;
    let view = booking_view(booking, user_from_entity(booker), item_from_entity(item))?;
    Ok(ApiResponse::success("Booking", view, None))
}

pub async fn list_bookings(
    state: &AppState,
    user: &SharerUser,
    role: BookingRole,
    raw_state: Option<&str>,
    pagination: Pagination,
) -> AppResult<ApiResponse<BookingList>> {
    let booking_state = booking_rules::parse_state(raw_state)?;
    let page = pagination.normalize()?;
    ensure_user_exists(state, user.user_id).await?;

    let finder: Select<Bookings> = match role {
        BookingRole::Booker => Bookings::find().filter(BookingCol::BookerId.eq(user.user_id)),
        BookingRole::Owner => Bookings::find()
            .inner_join(Items)
            .filter(ItemCol::OwnerId.eq(user.user_id)),
    };
    let finder = finder
        .filter(booking_rules::state_condition(booking_state, Utc::now()))
        .order_by_desc(BookingCol::StartDate)
        .order_by_asc(BookingCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let rows = finder
        .limit(page.size as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?;
    tracing::debug!(user_id = %user.user_id, ?role, state = ?booking_state, found = rows.len(), "listed bookings");

    let items = booking_views(&state.orm, rows).await?;
    Ok(ApiResponse::success(
        "Bookings",
        BookingList { items },
        Some(Meta::page(&page, total)),
    ))
}

fn booking_view(model: BookingModel, booker: User, item: Item) -> AppResult<Booking> {
    let status = booking_status(&model)?;
    Ok(Booking {
        id: model.id,
        start: model.start_date.with_timezone(&Utc),
        end: model.end_date.with_timezone(&Utc),
        status,
        booker,
        item,
    })
}

/// Resolves bookers and items for a page of bookings with two batched lookups.
async fn booking_views<C>(conn: &C, rows: Vec<BookingModel>) -> AppResult<Vec<Booking>>
where
    C: ConnectionTrait,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let item_ids: Vec<Uuid> = rows.iter().map(|b| b.item_id).collect();
    let booker_ids: Vec<Uuid> = rows.iter().map(|b| b.booker_id).collect();

    let items: HashMap<Uuid, Item> = Items::find()
        .filter(ItemCol::Id.is_in(item_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, item_from_entity(m)))
        .collect();
    let bookers: HashMap<Uuid, User> = Users::find()
        .filter(UserCol::Id.is_in(booker_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (m.id, user_from_entity(m)))
        .collect();

    rows.into_iter()
        .map(|row| {
            let item = items.get(&row.item_id).cloned().ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("booking {} lost its item", row.id))
            })?;
            let booker = bookers.get(&row.booker_id).cloned().ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("booking {} lost its booker", row.id))
            })?;
            booking_view(row, booker, item)
        })
        .collect()
}
