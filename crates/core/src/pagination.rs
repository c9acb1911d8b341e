//! Page metadata computation for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size used when a list request does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// A 1-based page request, as parsed from query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Items per page.
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: usize,
}

const fn default_page() -> usize {
    1
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Clamps the request into valid bounds: page >= 1, 1 <= size <= max.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Pagination metadata returned alongside every list response.
///
/// `start_index` and `end_index` are 1-based positions into the overall
/// result set; both are 0 when the requested page is beyond the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub start_index: usize,
    pub end_index: usize,
}

impl PageInfo {
    /// Computes page metadata for a clamped request over `total` items.
    #[must_use]
    pub fn compute(request: PageRequest, total: usize) -> Self {
        let PageRequest { page, page_size } = request.clamped();
        let total_pages = total.div_ceil(page_size);

        let in_range = total > 0 && page <= total_pages;
        let (start_index, end_index) = if in_range {
            ((page - 1) * page_size + 1, (page * page_size).min(total))
        } else {
            (0, 0)
        };

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1 && in_range,
            start_index,
            end_index,
        }
    }
}

/// Slices one page out of an in-memory result set.
///
/// Returns the page's items along with the computed metadata.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> (Vec<T>, PageInfo) {
    let info = PageInfo::compute(request, items.len());
    if info.start_index == 0 {
        return (Vec::new(), info);
    }

    let page_items = items
        .iter()
        .skip(info.start_index - 1)
        .take(info.page_size)
        .cloned()
        .collect();

    (page_items, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: usize, page_size: usize) -> PageRequest {
        PageRequest { page, page_size }
    }

    #[test]
    fn first_page_of_twenty_five() {
        let info = PageInfo::compute(request(1, 10), 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(!info.has_prev);
        assert_eq!(info.start_index, 1);
        assert_eq!(info.end_index, 10);
    }

    #[test]
    fn last_page_of_twenty_five() {
        let info = PageInfo::compute(request(3, 10), 25);
        assert!(!info.has_next);
        assert!(info.has_prev);
        assert_eq!(info.start_index, 21);
        assert_eq!(info.end_index, 25);
    }

    #[test]
    fn page_beyond_data_is_empty() {
        let info = PageInfo::compute(request(5, 10), 25);
        assert_eq!(info.start_index, 0);
        assert_eq!(info.end_index, 0);
        assert!(!info.has_next);
    }

    #[test]
    fn empty_result_set() {
        let info = PageInfo::compute(request(1, 10), 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
        assert_eq!(info.start_index, 0);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let info = PageInfo::compute(request(1, 0), 5);
        assert_eq!(info.page_size, 1);
        assert_eq!(info.total_pages, 5);
    }

    #[test]
    fn paginate_slices_the_requested_page() {
        let items: Vec<u32> = (1..=25).collect();
        let (page, info) = paginate(&items, request(2, 10));
        assert_eq!(page, (11..=20).collect::<Vec<u32>>());
        assert_eq!(info.start_index, 11);
        assert_eq!(info.end_index, 20);
    }

    #[test]
    fn page_info_serializes_camel_case() {
        let info = PageInfo::compute(request(1, 10), 25);
        let json = serde_json::to_value(info).expect("serialize");
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrev"], false);
        assert_eq!(json["startIndex"], 1);
    }
}
