use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{BookingHistoryEntry, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingHistoryList {
    pub items: Vec<BookingHistoryEntry>,
}
