//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for pagination.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
pub struct PaginationParams {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    /// Number of items per page (max 100)
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Offset for database queries.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    /// Limit for database queries.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Generic paged response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct PagedResponse<T> {
    /// The data items for this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    #[schema(example = 1)]
    pub page: u32,

    #[schema(example = 20)]
    pub page_size: u32,

    /// Total number of items across all pages
    #[schema(example = 100)]
    pub total_items: u64,

    #[schema(example = 5)]
    pub total_pages: u32,

    #[schema(example = true)]
    pub has_next: bool,

    #[schema(example = false)]
    pub has_prev: bool,
}

impl<T> PagedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: i64) -> Self {
        let total_items = total_items.max(0) as u64;
        let page_size = params.page_size.max(1);
        let total_pages = total_items.div_ceil(u64::from(page_size)) as u32;

        Self {
            data,
            pagination: PaginationMeta {
                page: params.page,
                page_size,
                total_items,
                total_pages,
                has_next: params.page < total_pages,
                has_prev: params.page > 1,
            },
        }
    }

    /// Builds the response from model rows, converting each through `From`.
    pub fn from_rows<R>(rows: Vec<R>, params: &PaginationParams, total_items: i64) -> Self
    where
        T: From<R>,
    {
        Self::new(rows.into_iter().map(T::from).collect(), params, total_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_offset_and_limit() {
        let params = PaginationParams::new(3, 20);
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_meta_flags() {
        let page: PagedResponse<u8> = PagedResponse::new(vec![], &PaginationParams::new(2, 10), 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);

        let last: PagedResponse<u8> = PagedResponse::new(vec![], &PaginationParams::new(3, 10), 25);
        assert!(!last.pagination.has_next);
    }

    #[test]
    fn test_empty_result() {
        let page: PagedResponse<u8> = PagedResponse::new(vec![], &PaginationParams::default(), 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next);
        assert!(!page.pagination.has_prev);
    }

    #[test]
    fn test_validation_bounds() {
        assert!(PaginationParams::new(0, 20).validate().is_err());
        assert!(PaginationParams::new(1, 101).validate().is_err());
        assert!(PaginationParams::new(1, 100).validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_total_pages_covers_items(total in 0i64..100_000, size in 1u32..=100) {
            let page: PagedResponse<u8> = PagedResponse::new(vec![], &PaginationParams::new(1, size), total);
            let pages = u64::from(page.pagination.total_pages);
            prop_assert!(pages * u64::from(size) >= total as u64);
            prop_assert!(pages == 0 || (pages - 1) * u64::from(size) < total as u64);
        }
    }
}
