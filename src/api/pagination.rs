use serde::Serialize;

use crate::config;
use crate::error::ApiError;

/// Validated page/per_page pair.
///
/// `page` must be >= 1 (rejected otherwise); `per_page` is clamped into
/// [1, max_per_page] rather than rejected, matching the list endpoints'
/// documented behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub per_page: i64,
}

impl PageParams {
    pub fn resolve(page: Option<i64>, per_page: Option<i64>) -> Result<Self, ApiError> {
        let api = &config::config().api;

        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::bad_request("page must be >= 1"));
        }

        let per_page = per_page
            .unwrap_or(api.default_per_page)
            .clamp(1, api.max_per_page);

        Ok(Self { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

/// Pagination block returned alongside every list response
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl PageInfo {
    pub fn new(params: PageParams, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + params.per_page - 1) / params.per_page
        };
        Self {
            page: params.page,
            per_page: params.per_page,
            total_pages,
            total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_absent() {
        let params = PageParams::resolve(None, None).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn per_page_is_clamped_to_bounds() {
        let params = PageParams::resolve(Some(1), Some(1000)).unwrap();
        assert_eq!(params.per_page, 100);

        let params = PageParams::resolve(Some(1), Some(0)).unwrap();
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn page_below_one_is_rejected() {
        assert!(PageParams::resolve(Some(0), None).is_err());
        assert!(PageParams::resolve(Some(-3), None).is_err());
    }

    #[test]
    fn offset_advances_by_page() {
        let params = PageParams::resolve(Some(3), Some(25)).unwrap();
        assert_eq!(params.offset(), 50);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn seven_items_across_pages_of_five() {
        let params = PageParams::resolve(Some(1), Some(5)).unwrap();
        let info = PageInfo::new(params, 7);
        assert_eq!(info.total_pages, 2);
        assert_eq!(info.total_items, 7);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let params = PageParams::resolve(Some(1), Some(10)).unwrap();
        let info = PageInfo::new(params, 0);
        assert_eq!(info.total_pages, 0);
    }
}
