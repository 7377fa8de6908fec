//! Pagination arithmetic shared by every store.
//!
//! # Invariants
//! - `page >= 1` and `1 <= limit <= MAX_LIMIT` for every `PageRequest`.
//! - `total_pages == ceil(total_item_count / limit)`.
//! - `has_next_page == (current_page < total_pages)`,
//!   `has_prev_page == (current_page > 1)`, also past the last page.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

// ASCII digits only: `\d` would also accept Arabic-Indic or full-width digits.
static LEADING_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?)([0-9]+)").expect("valid leading integer regex"));

/// Normalized `(page, limit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamps raw integers: `page < 1` becomes 1, `limit < 1` becomes the
    /// default of 10, and `limit > 100` is capped at 100.
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page < 1 {
            DEFAULT_PAGE
        } else {
            u32::try_from(page).unwrap_or(u32::MAX)
        };
        let limit = if limit < 1 {
            DEFAULT_LIMIT
        } else if limit > i64::from(MAX_LIMIT) {
            MAX_LIMIT
        } else {
            limit as u32
        };
        Self { page, limit }
    }

    /// Builds a request from untrusted text such as query-string values.
    ///
    /// Each value is read like `parseInt`: optional whitespace and sign, then
    /// leading digits; anything after the digits is ignored. Missing or
    /// non-numeric values fall back to the defaults.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page.and_then(coerce_integer).unwrap_or(0);
        let limit = limit.and_then(coerce_integer).unwrap_or(0);
        Self::new(page, limit)
    }

    /// Like [`PageRequest::from_raw`], for values that may arrive as JSON
    /// numbers as well as text.
    pub fn from_values(page: Option<&RawInteger>, limit: Option<&RawInteger>) -> Self {
        let page = page.and_then(RawInteger::coerce).unwrap_or(0);
        let limit = limit.and_then(RawInteger::coerce).unwrap_or(0);
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Metadata block of the pagination envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_item_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

impl PaginationInfo {
    pub fn new(request: PageRequest, total_item_count: u64) -> Self {
        let total_pages = total_item_count.div_ceil(u64::from(request.limit));
        Self {
            current_page: request.page,
            total_pages,
            total_item_count,
            has_next_page: u64::from(request.page) < total_pages,
            has_prev_page: request.page > 1,
            limit: request.limit,
        }
    }

    /// Metadata for a result set delivered whole, such as search results.
    pub fn single_page(item_count: u64, limit: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_item_count: item_count,
            has_next_page: false,
            has_prev_page: false,
            limit,
        }
    }
}

/// Pagination envelope: `{ items, pagination }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: PaginationInfo) -> Self {
        Self { items, pagination }
    }

    pub fn single(items: Vec<T>, limit: u32) -> Self {
        let pagination = PaginationInfo::single_page(items.len() as u64, limit);
        Self { items, pagination }
    }
}

/// A page or limit value as sent by a client: query-string text, or a
/// number from a JSON body. Anything else coerces to "missing".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawInteger {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl RawInteger {
    /// Integer value with `parseInt` semantics, or `None` for NaN-like input.
    pub fn coerce(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            // `as` saturates out-of-range floats; NaN has no integer value.
            Self::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            Self::Float(_) | Self::Other(_) => None,
            Self::Text(text) => coerce_integer(text),
        }
    }
}

impl From<i64> for RawInteger {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for RawInteger {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawInteger {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Raw listing parameters as they arrive from a query string or body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrowseQuery {
    pub page: Option<RawInteger>,
    pub limit: Option<RawInteger>,
    /// Substring search term; a blank term means "no search".
    pub search: Option<String>,
}

impl BrowseQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_values(self.page.as_ref(), self.limit.as_ref())
    }

    /// Returns the trimmed search term, or `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

fn coerce_integer(raw: &str) -> Option<i64> {
    let captures = LEADING_INTEGER_RE.captures(raw)?;
    let negative = &captures[1] == "-";
    // Only overflow can fail here: the capture is a non-empty ASCII digit run.
    let magnitude = match captures[2].parse::<i64>() {
        Ok(value) => value,
        Err(_) => i64::MAX,
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::{coerce_integer, BrowseQuery, Page, PageRequest, PaginationInfo, RawInteger};

    #[test]
    fn coerce_integer_follows_parse_int() {
        assert_eq!(coerce_integer("42"), Some(42));
        assert_eq!(coerce_integer("  7"), Some(7));
        assert_eq!(coerce_integer("12abc"), Some(12));
        assert_eq!(coerce_integer("-3"), Some(-3));
        assert_eq!(coerce_integer("+5"), Some(5));
        assert_eq!(coerce_integer("3.9"), Some(3));
        assert_eq!(coerce_integer("abc"), None);
        assert_eq!(coerce_integer(""), None);
        assert_eq!(coerce_integer("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(coerce_integer("-99999999999999999999999"), Some(-i64::MAX));
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        assert_eq!(coerce_integer("٣"), None);
        assert_eq!(coerce_integer("５"), None);
        assert_eq!(coerce_integer("7٣"), Some(7));

        let request = PageRequest::from_raw(Some("٣"), Some("٥"));
        assert_eq!((request.page(), request.limit()), (1, 10));
    }

    #[test]
    fn raw_integers_accept_numbers_and_text() {
        assert_eq!(RawInteger::from(5).coerce(), Some(5));
        assert_eq!(RawInteger::Float(5.9).coerce(), Some(5));
        assert_eq!(RawInteger::Float(-2.5).coerce(), Some(-2));
        assert_eq!(RawInteger::Float(f64::NAN).coerce(), None);
        assert_eq!(RawInteger::from("12abc").coerce(), Some(12));

        let values: Vec<RawInteger> =
            serde_json::from_value(serde_json::json!([3, 2.7, "4", true, [1]])).unwrap();
        let coerced = values.iter().map(RawInteger::coerce).collect::<Vec<_>>();
        assert_eq!(coerced, vec![Some(3), Some(2), Some(4), None, None]);
    }

    #[test]
    fn missing_or_garbage_values_use_defaults() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest::default());
        let request = PageRequest::from_raw(Some("x"), Some("?"));
        assert_eq!((request.page(), request.limit()), (1, 10));
        let request = PageRequest::from_raw(Some("0"), Some("0"));
        assert_eq!((request.page(), request.limit()), (1, 10));
    }

    #[test]
    fn limit_is_clamped_into_range() {
        assert_eq!(PageRequest::new(1, 500).limit(), 100);
        assert_eq!(PageRequest::new(1, 100).limit(), 100);
        assert_eq!(PageRequest::new(1, 1).limit(), 1);
        assert_eq!(PageRequest::new(1, -4).limit(), 10);
        assert_eq!(PageRequest::new(-9, 10).page(), 1);
        assert_eq!(PageRequest::new(i64::MAX, 10).page(), u32::MAX);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
        assert_eq!(
            PageRequest::new(i64::from(u32::MAX), 100).offset(),
            (u64::from(u32::MAX) - 1) * 100
        );
    }

    #[test]
    fn pagination_info_is_consistent() {
        let info = PaginationInfo::new(PageRequest::new(2, 10), 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next_page);
        assert!(info.has_prev_page);

        let last = PaginationInfo::new(PageRequest::new(3, 10), 25);
        assert!(!last.has_next_page);

        let exact = PaginationInfo::new(PageRequest::new(1, 5), 10);
        assert_eq!(exact.total_pages, 2);

        let empty = PaginationInfo::new(PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_prev_page);

        let beyond = PaginationInfo::new(PageRequest::new(9, 10), 25);
        assert_eq!(beyond.current_page, 9);
        assert!(!beyond.has_next_page);
        assert!(beyond.has_prev_page);
    }

    #[test]
    fn envelope_serializes_with_camel_case_keys() {
        let page = Page::new(vec![1, 2], PaginationInfo::new(PageRequest::new(1, 2), 3));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"], serde_json::json!([1, 2]));
        assert_eq!(
            json["pagination"],
            serde_json::json!({
                "currentPage": 1,
                "totalPages": 2,
                "totalItemCount": 3,
                "hasNextPage": true,
                "hasPrevPage": false,
                "limit": 2
            })
        );
    }

    #[test]
    fn browse_query_ignores_blank_search() {
        let query: BrowseQuery =
            serde_json::from_value(serde_json::json!({ "search": "   ", "limit": "5" })).unwrap();
        assert_eq!(query.search_term(), None);
        assert_eq!(query.page_request().limit(), 5);

        let query: BrowseQuery =
            serde_json::from_value(serde_json::json!({ "page": 2, "limit": 5 })).unwrap();
        let request = query.page_request();
        assert_eq!((request.page(), request.limit()), (2, 5));

        let query: BrowseQuery =
            serde_json::from_value(serde_json::json!({ "page": null, "limit": false })).unwrap();
        assert_eq!(query.page_request(), PageRequest::default());

        let query = BrowseQuery {
            search: Some("  fido ".to_string()),
            ..BrowseQuery::default()
        };
        assert_eq!(query.search_term(), Some("fido"));
    }
}
