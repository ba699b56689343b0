//! Page-based pagination on top of limit/offset.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of records per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default number of records returned by the "recent videos" listing.
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Highest page number accepted. Keeps `page * page_size` within `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Clamp a user-provided limit to `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided page number to `1..=MAX_PAGE`.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).clamp(1, MAX_PAGE)
}

// ---------------------------------------------------------------------------
// Page request / result
// ---------------------------------------------------------------------------

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Build a request from raw caller input, clamping both values.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: clamp_page(page),
            page_size: clamp_limit(page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus enough context to request the neighbours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page,
            page_size: request.page_size,
            has_next: request.page.saturating_mul(request.page_size) < total,
            has_previous: request.page > 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
    }

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(-3), 20, 100), 1);
    }

    #[test]
    fn page_request_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn page_request_offset() {
        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn page_zero_is_first_page() {
        assert_eq!(PageRequest::new(Some(0), None).page, 1);
    }

    #[test]
    fn huge_page_is_capped() {
        let req = PageRequest::new(Some(i64::MAX), Some(100));
        assert_eq!(req.page, MAX_PAGE);
        assert!(req.offset() > 0);

        let req = PageRequest::new(Some(i64::MAX), Some(20));
        assert!(req.offset() > 0);
    }

    #[test]
    fn huge_page_has_no_next() {
        let page = Paginated::<i32>::new(vec![], 5, PageRequest::new(Some(i64::MAX / 10), Some(100)));
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn offset_saturates_for_hand_built_requests() {
        let req = PageRequest {
            page: i64::MAX,
            page_size: MAX_PAGE_SIZE,
        };
        assert_eq!(req.offset(), i64::MAX);
    }

    #[test]
    fn paginated_flags() {
        let first = Paginated::new(vec![1, 2], 5, PageRequest::new(Some(1), Some(2)));
        assert!(first.has_next);
        assert!(!first.has_previous);

        let last = Paginated::new(vec![5], 5, PageRequest::new(Some(3), Some(2)));
        assert!(!last.has_next);
        assert!(last.has_previous);
    }
}
