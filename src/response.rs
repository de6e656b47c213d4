use serde::Serialize;
use utoipa::ToSchema;

use crate::routes::params::PageRequest;

/// Paging information attached to list responses.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub from: Option<i64>,
    pub size: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(from: i64, size: i64, total: i64) -> Self {
        Self {
            from: Some(from),
            size: Some(size),
            total: Some(total),
        }
    }

    /// Meta for one page of a larger result set.
    pub fn page(page: &PageRequest, total: i64) -> Self {
        Self::new(page.from, page.size, total)
    }

    /// Meta for an unpaged list returned in full.
    pub fn whole(total: i64) -> Self {
        Self::new(0, total, total)
    }

    pub fn empty() -> Self {
        Self {
            from: None,
            size: None,
            total: None,
        }
    }
}

/// Envelope every JSON response is wrapped in.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
