use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

pub const SHARER_USER_HEADER: &str = "x-sharer-user-id";

/// Caller identity taken from the `X-Sharer-User-Id` header.
///
/// There is no authentication behind it; the header is trusted as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerUser {
    pub user_id: Uuid,
}

impl SharerUser {
    pub fn from_header_value(raw: Option<&str>) -> Result<Self, AppError> {
        let raw = raw.ok_or_else(|| AppError::bad_request("Missing X-Sharer-User-Id header"))?;
        let user_id = Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::bad_request("Invalid X-Sharer-User-Id header"))?;
        Ok(Self { user_id })
    }
}

impl<S> FromRequestParts<S> for SharerUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = match parts.headers.get(SHARER_USER_HEADER) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| AppError::bad_request("Invalid X-Sharer-User-Id header"))?,
            ),
            None => None,
        };
        SharerUser::from_header_value(value)
    }
}
