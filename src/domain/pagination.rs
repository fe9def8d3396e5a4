use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::validation::{ValidationError, check_range, require_non_blank};
use crate::domain::value::SortOrder;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HalLink {
    pub href: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// HAL `_links` navigation block.
pub struct HalLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<HalLink>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<HalLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<HalLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<HalLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<HalLink>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl HalLinks {
    /// `cursor` query parameter of the `next` link, if any.
    pub fn next_cursor(&self) -> Option<String> {
        self.next.as_ref().and_then(|link| cursor_of(&link.href))
    }

    /// `cursor` query parameter of the `prev` link, if any.
    pub fn prev_cursor(&self) -> Option<String> {
        self.prev.as_ref().and_then(|link| cursor_of(&link.href))
    }
}

fn cursor_of(href: &str) -> Option<String> {
    let url = url::Url::parse(href)
        .or_else(|_| url::Url::parse("https://localhost").and_then(|base| base.join(href)))
        .ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "cursor")
        .map(|(_, value)| value.into_owned())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// HAL paged response.
///
/// `embedded` is `None` when the server omits `_embedded`; callers unwrapping
/// the collection see `None` rather than an empty sequence.
#[serde(bound(
    serialize = "E: Serialize",
    deserialize = "E: Deserialize<'de>"
))]
pub struct HalPage<E> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HalLinks>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<E>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Page bounds of an offset-paginated resource.
pub struct PageLimits {
    pub min_page: u32,
    pub min_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Offset pagination: `page`, `page_size`, `order`.
pub struct PageFilter {
    page: Option<u32>,
    page_size: Option<u32>,
    order: Option<SortOrder>,
}

impl PageFilter {
    /// Create a validated filter. Absent values are left for the server to default.
    pub fn new(
        page: Option<u32>,
        page_size: Option<u32>,
        order: Option<SortOrder>,
        limits: PageLimits,
    ) -> Result<Self, ValidationError> {
        if let Some(page) = page {
            check_range("page", i64::from(page), i64::from(limits.min_page), i64::from(u32::MAX))?;
        }
        if let Some(page_size) = page_size {
            check_range(
                "page_size",
                i64::from(page_size),
                i64::from(limits.min_page_size),
                i64::from(limits.max_page_size),
            )?;
        }
        Ok(Self {
            page,
            page_size,
            order,
        })
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Cursor pagination: `page_size`, `order`, `cursor`.
pub struct CursorFilter {
    page_size: Option<u32>,
    order: Option<SortOrder>,
    cursor: Option<String>,
}

impl CursorFilter {
    pub const MIN_PAGE_SIZE: u32 = 1;
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn new(
        page_size: Option<u32>,
        order: Option<SortOrder>,
        cursor: Option<String>,
    ) -> Result<Self, ValidationError> {
        if let Some(page_size) = page_size {
            check_range(
                "page_size",
                i64::from(page_size),
                i64::from(Self::MIN_PAGE_SIZE),
                i64::from(Self::MAX_PAGE_SIZE),
            )?;
        }
        let cursor = cursor.map(|c| require_non_blank("cursor", c)).transpose()?;
        Ok(Self {
            page_size,
            order,
            cursor,
        })
    }

    /// Filter continuing from the `next` link of a previous page.
    pub fn next_of(links: &HalLinks, page_size: Option<u32>) -> Option<Result<Self, ValidationError>> {
        links
            .next_cursor()
            .map(|cursor| Self::new(page_size, None, Some(cursor)))
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PageLimits = PageLimits {
        min_page: 1,
        min_page_size: 1,
        max_page_size: 1000,
    };

    #[test]
    fn page_filter_enforces_limits() {
        assert!(PageFilter::new(Some(1), Some(1000), None, LIMITS).is_ok());
        assert!(PageFilter::new(Some(0), None, None, LIMITS).is_err());
        assert!(PageFilter::new(None, Some(1001), None, LIMITS).is_err());
        assert!(PageFilter::new(None, Some(0), None, LIMITS).is_err());
        assert_eq!(
            PageFilter::new(None, None, None, LIMITS).unwrap(),
            PageFilter::default()
        );
    }

    #[test]
    fn cursor_filter_enforces_page_size() {
        assert!(CursorFilter::new(Some(100), Some(SortOrder::Desc), None).is_ok());
        assert!(CursorFilter::new(Some(101), None, None).is_err());
        assert!(CursorFilter::new(None, None, Some("  ".to_owned())).is_err());
    }

    #[test]
    fn links_expose_cursors() {
        let json = r#"{
            "first": {"href": "https://api.nexmo.com/v1/conversations?order=desc&page_size=10"},
            "self": {"href": "https://api.nexmo.com/v1/conversations?order=desc&page_size=10&cursor=abc"},
            "next": {"href": "https://api.nexmo.com/v1/conversations?order=desc&page_size=10&cursor=7EjDNQrAcipmOnc0HCzpQRkhBULzY44ljGUX%2FlzXmLc%3D"},
            "prev": {"href": "/v1/conversations?cursor=prev123"}
        }"#;
        let links: HalLinks = serde_json::from_str(json).unwrap();
        assert_eq!(
            links.next_cursor().as_deref(),
            Some("7EjDNQrAcipmOnc0HCzpQRkhBULzY44ljGUX/lzXmLc=")
        );
        assert_eq!(links.prev_cursor().as_deref(), Some("prev123"));
        assert!(links.self_link.is_some());

        let next = CursorFilter::next_of(&links, Some(10)).unwrap().unwrap();
        assert_eq!(next.page_size(), Some(10));
        assert!(next.cursor().is_some());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Things {
        things: Option<Vec<u32>>,
    }

    #[test]
    fn hal_page_distinguishes_absent_embedded() {
        let page: HalPage<Things> =
            serde_json::from_str(r#"{"page": 1, "page_size": 10, "total_items": 0}"#).unwrap();
        assert!(page.embedded.is_none());

        let page: HalPage<Things> =
            serde_json::from_str(r#"{"_embedded": {"things": []}, "extra_field": true}"#).unwrap();
        assert_eq!(page.embedded.unwrap().things, Some(vec![]));
        assert_eq!(page.extra.get("extra_field"), Some(&Value::Bool(true)));
    }
}
