use chrono::Utc;

use crate::{
    entity::{bookings, comments, item_requests, items, users},
    error::{AppError, AppResult},
    models::{BookingShort, BookingStatus, Comment, Item, ItemRequest, User},
};

pub fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn item_from_entity(model: items::Model) -> Item {
    Item {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        description: model.description,
        available: model.available,
        request_id: model.request_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn booking_status(model: &bookings::Model) -> AppResult<BookingStatus> {
    model
        .status
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!("booking {}: {e}", model.id)))
}

pub fn booking_short_from_entity(model: &bookings::Model) -> BookingShort {
    BookingShort {
        id: model.id,
        booker_id: model.booker_id,
        start: model.start_date.with_timezone(&Utc),
        end: model.end_date.with_timezone(&Utc),
    }
}

pub fn comment_from_entity(model: comments::Model, author_name: String) -> Comment {
    Comment {
        id: model.id,
        text: model.text,
        item_id: model.item_id,
        author_name,
        created: model.created_at.with_timezone(&Utc),
    }
}

pub fn request_from_entity(model: item_requests::Model, items: Vec<Item>) -> ItemRequest {
    ItemRequest {
        id: model.id,
        description: model.description,
        requestor_id: model.requestor_id,
        created: model.created_at.with_timezone(&Utc),
        items,
    }
}
