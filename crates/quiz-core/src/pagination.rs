//! Page-based pagination for list views.
//!
//! List pages (`/users`, `/quizzes`, `/users/{userId}/quizzes`) show
//! [`DEFAULT_PER_PAGE`] items and accept a 1-indexed `page` query parameter.
//! An explicit `limit` is honoured for callers that want bigger pages, clamped to
//! `[1, 100]`.
//!
//! # Example
//!
//! ```ignore
//! // GET /quizzes?page=3
//! let params = PaginationParams { page: Some(3), limit: None };
//!
//! assert_eq!(params.limit(), 10);
//! assert_eq!(params.offset(), 20);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Items per page when the request does not say otherwise.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Deserializes an optional string into an optional i64.
///
/// Query parameters may arrive as empty strings (`?page=`), which are treated as
/// `None`.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata about a paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Items per page
    pub limit: i64,
    /// Current page (1-indexed)
    pub page: i64,
    /// Number of pages (at least 1)
    pub pages: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let page = params.page();
        let pages = ((total + limit - 1) / limit).max(1);

        Self {
            total,
            limit,
            page,
            pages,
            has_more: params.offset().saturating_add(limit) < total,
        }
    }
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, Deserialize, ToSchema)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PER_PAGE).clamp(1, 100)
    }

    /// Returns the page number, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Number of items to skip for the current page. Saturates for pages far
    /// past the end, which then come back empty.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_params_page_offset() {
        let params = PaginationParams {
            page: Some(3),
            limit: None,
        };
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_pagination_params_limit_boundaries() {
        let low = PaginationParams {
            page: None,
            limit: Some(0),
        };
        let high = PaginationParams {
            page: None,
            limit: Some(150),
        };
        assert_eq!(low.limit(), 1);
        assert_eq!(high.limit(), 100);
    }

    #[test]
    fn test_pagination_params_negative_page() {
        let params = PaginationParams {
            page: Some(-4),
            limit: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_params_empty_strings_are_none() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":"","limit":""}"#).unwrap();
        assert_eq!(params, PaginationParams::default());
    }

    #[test]
    fn test_pagination_meta() {
        let params = PaginationParams {
            page: Some(2),
            limit: None,
        };
        let meta = PaginationMeta::new(25, &params);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.page, 2);
        assert!(meta.has_more);

        let last = PaginationMeta::new(
            25,
            &PaginationParams {
                page: Some(3),
                limit: None,
            },
        );
        assert!(!last.has_more);
    }

    #[test]
    fn test_pagination_huge_page_saturates() {
        let params = PaginationParams {
            page: Some(i64::MAX),
            limit: Some(100),
        };
        assert_eq!(params.offset(), i64::MAX);

        let meta = PaginationMeta::new(25, &params);
        assert_eq!(meta.page, i64::MAX);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_pagination_meta_empty_list_has_one_page() {
        let meta = PaginationMeta::new(0, &PaginationParams::default());
        assert_eq!(meta.pages, 1);
        assert!(!meta.has_more);
    }
}
