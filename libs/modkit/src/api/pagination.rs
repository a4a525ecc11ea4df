//! Page-number pagination: request clamping, page results and the
//! `X-Pagination` response header.

use axum::http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::api::links::LinkGenerator;

pub const X_PAGINATION: HeaderName = HeaderName::from_static("x-pagination");

pub const MIN_PAGE_NUMBER: u32 = 1;
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 20;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A clamped page request: `number >= 1`, `size` within `[1, 20]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: MIN_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Snap arbitrary values onto the allowed ranges.
    pub fn clamp(number: i64, size: i64) -> Self {
        let number = number.clamp(i64::from(MIN_PAGE_NUMBER), i64::from(u32::MAX));
        let size = size.clamp(i64::from(MIN_PAGE_SIZE), i64::from(MAX_PAGE_SIZE));
        // both are within u32 after clamping
        Self {
            number: u32::try_from(number).unwrap_or(MIN_PAGE_NUMBER),
            size: u32::try_from(size).unwrap_or(MAX_PAGE_SIZE),
        }
    }

    /// Build from raw query strings. Absent or non-numeric values take the
    /// defaults; numeric values are clamped, never rejected.
    pub fn from_raw(number: Option<&str>, size: Option<&str>, default_size: u32) -> Self {
        Self::clamp(
            number
                .and_then(parse_saturating)
                .unwrap_or(i64::from(MIN_PAGE_NUMBER)),
            size.and_then(parse_saturating)
                .unwrap_or(i64::from(default_size)),
        )
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }
}

/// Parse a signed integer; all-digit values beyond `i64` saturate.
fn parse_saturating(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// One page of items plus the totals needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
    /// Count across all pages.
    pub total_count: u64,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_count: u64) -> Self {
        Self {
            items,
            current_page: request.number,
            page_size: request.size,
            total_count,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.page_size.max(1)))
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.current_page) < self.total_pages()
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}

/// JSON payload of the `X-Pagination` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHeader {
    pub previous_page_link: Option<String>,
    pub next_page_link: Option<String>,
    pub total_count: u64,
    pub page_size: u32,
    pub current_page: u32,
    pub total_pages: u64,
}

impl PaginationHeader {
    /// Describe `page`, linking neighbours through `list_operation`.
    pub fn for_page<T>(
        page: &PagedList<T>,
        links: &dyn LinkGenerator,
        list_operation: &str,
    ) -> anyhow::Result<Self> {
        let link_to = |number: u32| {
            links.link(
                list_operation,
                &[
                    ("pageNumber", number.to_string()),
                    ("pageSize", page.page_size.to_string()),
                ],
            )
        };

        let previous_page_link = if page.has_previous() {
            Some(link_to(page.current_page - 1)?)
        } else {
            None
        };
        let next_page_link = if page.has_next() {
            Some(link_to(page.current_page + 1)?)
        } else {
            None
        };

        Ok(Self {
            previous_page_link,
            next_page_link,
            total_count: page.total_count,
            page_size: page.page_size,
            current_page: page.current_page,
            total_pages: page.total_pages(),
        })
    }

    pub fn to_header_value(&self) -> anyhow::Result<HeaderValue> {
        let json = serde_json::to_string(self)?;
        Ok(HeaderValue::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLinks;

    impl LinkGenerator for FakeLinks {
        fn link(&self, operation_id: &str, params: &[(&str, String)]) -> anyhow::Result<String> {
            let query = params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            Ok(format!("http://test/{operation_id}?{query}"))
        }
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(PageRequest::clamp(0, 100), PageRequest { number: 1, size: 20 });
        assert_eq!(PageRequest::clamp(-7, 0), PageRequest { number: 1, size: 1 });
        assert_eq!(PageRequest::clamp(3, 5), PageRequest { number: 3, size: 5 });
        assert_eq!(PageRequest::clamp(i64::MAX, -1).number, u32::MAX);
    }

    #[test]
    fn raw_values_fall_back_to_defaults() {
        assert_eq!(
            PageRequest::from_raw(None, None, 10),
            PageRequest { number: 1, size: 10 }
        );
        assert_eq!(
            PageRequest::from_raw(Some("abc"), Some(""), 7),
            PageRequest { number: 1, size: 7 }
        );
        assert_eq!(
            PageRequest::from_raw(Some("0"), Some("100"), 10),
            PageRequest { number: 1, size: 20 }
        );
        assert_eq!(
            PageRequest::from_raw(Some(" 2 "), Some("-3"), 10),
            PageRequest { number: 2, size: 1 }
        );
    }

    #[test]
    fn overflowing_numbers_saturate() {
        assert_eq!(
            PageRequest::from_raw(Some("99999999999999999999"), Some("99999999999999999999"), 10),
            PageRequest {
                number: u32::MAX,
                size: MAX_PAGE_SIZE
            }
        );
        assert_eq!(
            PageRequest::from_raw(Some("-99999999999999999999"), Some("-99999999999999999999"), 10),
            PageRequest { number: 1, size: 1 }
        );
        assert_eq!(
            PageRequest::from_raw(Some("9999999999999999999x"), None, 10),
            PageRequest { number: 1, size: 10 }
        );
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::clamp(1, 10).offset(), 0);
        assert_eq!(PageRequest::clamp(3, 5).offset(), 10);
    }

    #[test]
    fn derived_navigation_flags() {
        let page = PagedList::new(vec![1, 2], PageRequest::clamp(2, 2), 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_previous());
        assert!(page.has_next());

        let last = PagedList::new(vec![5], PageRequest::clamp(3, 2), 5);
        assert!(!last.has_next());

        let empty = PagedList::<u8>::new(vec![], PageRequest::clamp(1, 10), 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_previous());
        assert!(!empty.has_next());
    }

    #[test]
    fn header_links_neighbours_only_when_they_exist() {
        let first = PagedList::new(vec![(); 2], PageRequest::clamp(1, 2), 3);
        let header = PaginationHeader::for_page(&first, &FakeLinks, "users.list").unwrap();
        assert_eq!(header.previous_page_link, None);
        assert_eq!(
            header.next_page_link.as_deref(),
            Some("http://test/users.list?pageNumber=2&pageSize=2")
        );
        assert_eq!(header.total_pages, 2);

        let second = PagedList::new(vec![()], PageRequest::clamp(2, 2), 3);
        let header = PaginationHeader::for_page(&second, &FakeLinks, "users.list").unwrap();
        assert_eq!(
            header.previous_page_link.as_deref(),
            Some("http://test/users.list?pageNumber=1&pageSize=2")
        );
        assert_eq!(header.next_page_link, None);
    }

    #[test]
    fn header_value_is_camel_case_json() {
        let page = PagedList::new(vec![0u8; 1], PageRequest::clamp(1, 20), 1);
        let header = PaginationHeader::for_page(&page, &FakeLinks, "users.list").unwrap();
        let value = header.to_header_value().unwrap();
        let json: serde_json::Value = serde_json::from_str(value.to_str().unwrap()).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["pageSize"], 20);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["totalPages"], 1);
        assert!(json["previousPageLink"].is_null());
        assert!(json["nextPageLink"].is_null());
    }
}
