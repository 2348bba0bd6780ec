//! API request and response types

use crate::models::{BlogStatus, BlogSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Default page size for blog listings
pub const DEFAULT_PAGE_LIMIT: i64 = 10;
/// Largest page size a client may request
pub const MAX_PAGE_LIMIT: i64 = 50;

/// Error envelope returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Users and authentication
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "handle is required"))]
    pub handle: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub handle: String,
    pub name: String,
    pub email: String,
}

// ============================================================================
// Blog
// ============================================================================

/// Create blog post request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "reading time cannot be negative"))]
    pub reading_time: i32,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub meta_keywords: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial blog post update; absent or empty fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBlogRequest {
    #[validate(length(max = 255, message = "title too long"))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, message = "reading time cannot be negative"))]
    pub reading_time: Option<i32>,
    pub status: Option<BlogStatus>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Single tag association request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 64, message = "tag must be 1-64 characters"))]
    pub tag: String,
}

/// Blog listing query parameters
///
/// Unparsable `page` or `limit` values are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogListQuery {
    #[serde(default, deserialize_with = "lenient_number")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub limit: Option<i64>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer).unwrap_or(None);
    Ok(match value {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// Blog listing query after defaults have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogFilter {
    pub page: i64,
    pub limit: i64,
    /// `None` means every category
    pub category: Option<String>,
}

impl BlogFilter {
    /// Rows to skip; saturates for pages far past the end
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl BlogListQuery {
    /// Apply pagination defaults
    ///
    /// A page below 1 becomes 1 and a limit outside `1..=50` becomes 10.
    /// An empty category or `all` disables the category filter.
    pub fn normalize(self) -> BlogFilter {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self
            .limit
            .filter(|l| (1..=MAX_PAGE_LIMIT).contains(l))
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

        BlogFilter {
            page,
            limit,
            category,
        }
    }
}

/// Blog listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogListResponse {
    pub items: Vec<BlogSummary>,
    pub page: i64,
    pub limit: i64,
}

// ============================================================================
// Personalization
// ============================================================================

/// Personalization create/update request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PersonalizationRequest {
    #[serde(default)]
    #[validate(length(max = 2000, message = "description too long"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 2048, message = "photo reference too long"))]
    pub photo: String,
}

/// Personalization as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonalizationResponse {
    pub description: String,
    pub photo: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(0), Some(0), 1, 10)]
    #[case(Some(-3), Some(51), 1, 10)]
    #[case(Some(2), Some(50), 2, 50)]
    #[case(Some(4), Some(1), 4, 1)]
    fn test_pagination_defaults(
        #[case] page: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] want_page: i64,
        #[case] want_limit: i64,
    ) {
        let filter = BlogListQuery {
            page,
            limit,
            category: None,
        }
        .normalize();
        assert_eq!(filter.page, want_page);
        assert_eq!(filter.limit, want_limit);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("All"), None)]
    #[case(Some("  rust "), Some("rust"))]
    fn test_category_filter(#[case] category: Option<&str>, #[case] want: Option<&str>) {
        let filter = BlogListQuery {
            page: None,
            limit: None,
            category: category.map(str::to_string),
        }
        .normalize();
        assert_eq!(filter.category.as_deref(), want);
    }

    #[test]
    fn test_offset() {
        let filter = BlogListQuery {
            page: Some(3),
            limit: Some(20),
            category: None,
        }
        .normalize();
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            handle: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "pw1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            email: "not-an-email".to_string(),
            handle: String::new(),
            ..valid
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("handle"));
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        let filter = BlogListQuery {
            page: Some(i64::MAX),
            limit: Some(50),
            category: None,
        }
        .normalize();
        assert_eq!(filter.page, i64::MAX);
        assert_eq!(filter.offset(), i64::MAX);
    }

    #[rstest]
    #[case(r#"{"page": "abc", "limit": "x"}"#, None, None)]
    #[case(r#"{"page": "3", "limit": " 20 "}"#, Some(3), Some(20))]
    #[case(r#"{"page": 2, "limit": 5}"#, Some(2), Some(5))]
    #[case(r#"{"page": 1.5, "limit": null}"#, None, None)]
    #[case(r#"{}"#, None, None)]
    fn test_list_query_is_lenient(
        #[case] body: &str,
        #[case] page: Option<i64>,
        #[case] limit: Option<i64>,
    ) {
        let query: BlogListQuery = serde_json::from_str(body).unwrap();
        assert_eq!(query.page, page);
        assert_eq!(query.limit, limit);
    }

    #[test]
    fn test_update_request_accepts_empty_body() {
        let req: UpdateBlogRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.tags.is_none());
    }
}
