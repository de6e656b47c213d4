use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use shareit::{
    db::{create_pool, run_migrations},
    dto::{
        items::{CreateCommentRequest, CreateItemRequest, UpdateItemRequest},
        users::CreateUserRequest,
    },
    entity::bookings::ActiveModel as BookingActive,
    error::AppError,
    middleware::sharer::SharerUser,
    models::BookingStatus,
    routes::params::Pagination,
    services::{item_service, user_service},
    state::AppState,
};
use uuid::Uuid;

// Integration flow: owner lists an item -> search -> bookings shape last/next -> comment after use.
#[tokio::test]
async fn item_search_and_comment_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let owner = create_user(&state, "Olga").await?;
    let booker = create_user(&state, "Boris").await?;
    let stranger = create_user(&state, "Sam").await?;

    let missing_flag = item_service::create_item(
        &state,
        &owner,
        CreateItemRequest {
            name: Some("Drill".into()),
            description: Some("Cordless".into()),
            available: None,
            request_id: None,
        },
    )
    .await;
    assert!(matches!(missing_flag, Err(AppError::BadRequest(_))));

    let unknown_request = item_service::create_item(
        &state,
        &owner,
        CreateItemRequest {
            name: Some("Drill".into()),
            description: Some("Cordless".into()),
            available: Some(true),
            request_id: Some(Uuid::new_v4()),
        },
    )
    .await;
    assert!(matches!(unknown_request, Err(AppError::NotFound(_))));

    let token = Uuid::new_v4().simple().to_string();
    let item = item_service::create_item(
        &state,
        &owner,
        CreateItemRequest {
            name: Some(format!("Drill {token}")),
            description: Some(format!("Cordless drill, tag {token}")),
            available: Some(true),
            request_id: None,
        },
    )
    .await?
    .data
    .expect("item");
    assert_eq!(item.owner_id, owner.user_id);

    // Only the owner may edit
    let hijack = item_service::update_item(
        &state,
        &stranger,
        item.id,
        UpdateItemRequest {
            name: Some("Mine now".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(hijack, Err(AppError::Forbidden(_))));

    // Unavailable items drop out of search
    item_service::update_item(
        &state,
        &owner,
        item.id,
        UpdateItemRequest {
            available: Some(false),
            ..Default::default()
        },
    )
    .await?;
    let hits = search(&state, &token).await?;
    assert!(hits.is_empty());

    let updated = item_service::update_item(
        &state,
        &owner,
        item.id,
        UpdateItemRequest {
            available: Some(true),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("item");
    assert!(updated.available);
    assert_eq!(updated.name, item.name);

    // Search is case-insensitive over name and description
    let hits = search(&state, &token.to_uppercase()).await?;
    assert_eq!(hits, vec![item.id]);

    // No finished booking yet, so no comment
    let early = item_service::add_comment(
        &state,
        &booker,
        item.id,
        CreateCommentRequest {
            text: Some("Great drill".into()),
        },
    )
    .await;
    assert!(matches!(early, Err(AppError::BadRequest(_))));

    let now = Utc::now();
    let finished = insert_booking(
        &state,
        item.id,
        booker.user_id,
        now - Duration::days(3),
        now - Duration::days(2),
        BookingStatus::Approved,
    )
    .await?;
    let upcoming = insert_booking(
        &state,
        item.id,
        booker.user_id,
        now + Duration::days(1),
        now + Duration::days(2),
        BookingStatus::Waiting,
    )
    .await?;
    // Rejected bookings never show up as last or next
    insert_booking(
        &state,
        item.id,
        booker.user_id,
        now + Duration::hours(1),
        now + Duration::hours(2),
        BookingStatus::Rejected,
    )
    .await?;

    let blank = item_service::add_comment(
        &state,
        &booker,
        item.id,
        CreateCommentRequest {
            text: Some("  ".into()),
        },
    )
    .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let comment = item_service::add_comment(
        &state,
        &booker,
        item.id,
        CreateCommentRequest {
            text: Some("Great drill".into()),
        },
    )
    .await?
    .data
    .expect("comment");
    assert_eq!(comment.author_name, "Boris");
    assert_eq!(comment.item_id, item.id);

    let stranger_comment = item_service::add_comment(
        &state,
        &stranger,
        item.id,
        CreateCommentRequest {
            text: Some("Never used it".into()),
        },
    )
    .await;
    assert!(matches!(stranger_comment, Err(AppError::BadRequest(_))));

    // Ended bookings that were never approved do not allow a comment
    let waiter = create_user(&state, "Wendy").await?;
    insert_booking(
        &state,
        item.id,
        waiter.user_id,
        now - Duration::days(6),
        now - Duration::days(5),
        BookingStatus::Waiting,
    )
    .await?;
    insert_booking(
        &state,
        item.id,
        waiter.user_id,
        now - Duration::days(8),
        now - Duration::days(7),
        BookingStatus::Rejected,
    )
    .await?;
    let unapproved = item_service::add_comment(
        &state,
        &waiter,
        item.id,
        CreateCommentRequest {
            text: Some("Still waiting".into()),
        },
    )
    .await;
    assert!(matches!(unapproved, Err(AppError::BadRequest(_))));

    // The owner sees last/next bookings, everyone sees comments
    let as_owner = item_service::get_item(&state, &owner, item.id)
        .await?
        .data
        .expect("item");
    assert_eq!(as_owner.last_booking.map(|b| b.id), Some(finished));
    assert_eq!(as_owner.next_booking.map(|b| b.id), Some(upcoming));
    assert_eq!(as_owner.comments.len(), 1);

    let as_booker = item_service::get_item(&state, &booker, item.id)
        .await?
        .data
        .expect("item");
    assert!(as_booker.last_booking.is_none());
    assert!(as_booker.next_booking.is_none());
    assert_eq!(as_booker.comments[0].text, "Great drill");

    let listed = item_service::list_owner_items(&state, &owner, Pagination::default()).await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(1));
    let listed = listed.data.expect("items").items;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].next_booking.as_ref().map(|b| b.id), Some(upcoming));
    assert_eq!(listed[0].comments.len(), 1);

    let nothing = item_service::list_owner_items(&state, &stranger, Pagination::default())
        .await?
        .data
        .expect("items");
    assert!(nothing.items.is_empty());

    assert!(matches!(
        item_service::get_item(&state, &owner, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}

async fn search(state: &AppState, text: &str) -> anyhow::Result<Vec<Uuid>> {
    let found = item_service::search_items(state, Some(text.to_string()), Pagination::default())
        .await?
        .data
        .expect("items");
    Ok(found.items.into_iter().map(|i| i.id).collect())
}

async fn insert_booking(
    state: &AppState,
    item_id: Uuid,
    booker_id: Uuid,
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
    status: BookingStatus,
) -> anyhow::Result<Uuid> {
    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        item_id: Set(item_id),
        booker_id: Set(booker_id),
        start_date: Set(start.fixed_offset()),
        end_date: Set(end.fixed_offset()),
        status: Set(status.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(booking.id)
}

async fn create_user(state: &AppState, name: &str) -> anyhow::Result<SharerUser> {
    let user = user_service::create_user(
        state,
        CreateUserRequest {
            name: Some(name.to_string()),
            email: Some(format!(
                "{}-{}@example.com",
                name.to_lowercase(),
                Uuid::new_v4().simple()
            )),
        },
    )
    .await?
    .data
    .expect("user");
    Ok(SharerUser { user_id: user.id })
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let state = AppState::new(create_pool(&database_url, 5).await?);
    run_migrations(&state.orm).await?;
    Ok(Some(state))
}
