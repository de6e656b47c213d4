use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::{AuditEvent, record},
    dto::users::{BookingHistoryList, CreateUserRequest, UpdateUserRequest, UserList},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::{BookingHistoryEntry, User},
    response::{ApiResponse, Meta},
    services::convert::user_from_entity,
    state::AppState,
    validation,
};

/// Loads a user or fails with 404; shared by every service that needs the caller to exist.
pub async fn find_user(state: &AppState, id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} does not exist")))
}

pub async fn ensure_user_exists(state: &AppState, id: Uuid) -> AppResult<()> {
    let count = Users::find_by_id(id).count(&state.orm).await?;
    if count == 0 {
        return Err(AppError::not_found(format!("User {id} does not exist")));
    }
    Ok(())
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Users::find().filter(UserCol::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(UserCol::Id.ne(id));
    }
    if finder.count(&state.orm).await? > 0 {
        return Err(AppError::Conflict(format!("Email {email} is already taken")));
    }
    Ok(())
}

pub async fn create_user(
    state: &AppState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let name = validation::required_text("name", payload.name)?;
    let email = validation::email(validation::required_text("email", payload.email)?)?;
    ensure_email_free(state, &email, None).await?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    tracing::info!(user_id = %user.id, "user created");

    record(
        &state.pool,
        AuditEvent::new(user.id, "user_create", "users", serde_json::json!({ "user_id": user.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(state: &AppState) -> AppResult<ApiResponse<UserList>> {
    let items: Vec<User> = Users::find()
        .order_by_asc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::whole(total)),
    ))
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<User>> {
    let user = find_user(state, id).await?;
    Ok(ApiResponse::success("User", user_from_entity(user), None))
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = find_user(state, id).await?;

    let name = validation::optional_text("name", payload.name)?;
    let email = validation::optional_text("email", payload.email)?
        .map(validation::email)
        .transpose()?;
    if let Some(email) = email.as_deref() {
        ensure_email_free(state, email, Some(id)).await?;
    }

    let mut active: UserActive = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    let user = active.update(&state.orm).await?;
    tracing::info!(user_id = %user.id, "user updated");

    record(
        &state.pool,
        AuditEvent::new(user.id, "user_update", "users", serde_json::json!({ "user_id": user.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        user_from_entity(user),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(format!("User {id} does not exist")));
    }
    tracing::info!(user_id = %id, "user deleted");

    record(
        &state.pool,
        AuditEvent::new(id, "user_delete", "users", serde_json::json!({ "user_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn booking_history(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<BookingHistoryList>> {
    ensure_user_exists(state, id).await?;

    let items = sqlx::query_as::<_, BookingHistoryEntry>(
        r#"
        SELECT b.id AS booking_id, u.id AS user_id, u.name AS user_name,
               i.id AS item_id, i.name AS item_name,
               b.start_date, b.end_date, b.status
        FROM bookings b
        JOIN users u ON u.id = b.booker_id
        JOIN items i ON i.id = b.item_id
        WHERE b.booker_id = $1
        ORDER BY b.start_date DESC
        "#,
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Booking history",
        BookingHistoryList { items },
        Some(Meta::whole(total)),
    ))
}
