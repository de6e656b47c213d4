use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{BookingShort, Comment, Item};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub text: Option<String>,
}

/// An item together with its comments and, for the owner, its surrounding bookings.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetails {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
    pub comments: Vec<Comment>,
}

impl ItemDetails {
    pub fn new(
        item: Item,
        last_booking: Option<BookingShort>,
        next_booking: Option<BookingShort>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id: item.id,
            owner_id: item.owner_id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            created_at: item.created_at,
            last_booking,
            next_booking,
            comments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemList {
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetailsList {
    pub items: Vec<ItemDetails>,
}
