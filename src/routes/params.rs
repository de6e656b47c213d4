use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `from`/`size` paging as clients send it.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Index of the first element, default 0.
    pub from: Option<i64>,
    /// Page size, default 10, capped at 100.
    pub size: Option<i64>,
}

/// Validated window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub from: i64,
    pub size: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(from: i64, size: i64) -> Self {
        Self {
            from: Some(from),
            size: Some(size),
        }
    }

    /// Rejects negative `from` and non-positive `size`; aligns the offset to whole pages.
    pub fn normalize(&self) -> AppResult<PageRequest> {
        let from = self.from.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if from < 0 {
            return Err(AppError::bad_request("from must not be negative"));
        }
        if size < 1 {
            return Err(AppError::bad_request("size must be greater than 0"));
        }
        let size = size.min(MAX_PAGE_SIZE);
        let offset = (from / size) * size;
        Ok(PageRequest { from, size, offset })
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    /// ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED; default ALL.
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl BookingListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            from: self.from,
            size: self.size,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            from: self.from,
            size: self.size,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DecisionQuery {
    pub approved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let page = Pagination::default().normalize().unwrap();
        assert_eq!(page, PageRequest { from: 0, size: 10, offset: 0 });
    }

    #[test]
    fn offset_is_aligned_to_whole_pages() {
        let page = Pagination::new(7, 5).normalize().unwrap();
        assert_eq!(page.offset, 5);
        let page = Pagination::new(10, 5).normalize().unwrap();
        assert_eq!(page.offset, 10);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Pagination::new(-1, 10).normalize().is_err());
        assert!(Pagination::new(0, 0).normalize().is_err());
        assert!(Pagination::new(0, -3).normalize().is_err());
    }

    #[test]
    fn caps_page_size() {
        let page = Pagination::new(0, 5000).normalize().unwrap();
        assert_eq!(page.size, MAX_PAGE_SIZE);
    }
}
