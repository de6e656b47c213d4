use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ItemRequest;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequestRequest {
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemRequestList {
    pub items: Vec<ItemRequest>,
}
