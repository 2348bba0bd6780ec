//! Domain models exposed by the Quill API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Publication state of a blog post
///
/// New posts start as drafts; only published posts are visible on the
/// public listing and slug lookup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
            BlogStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(BlogStatus::Draft),
            "published" => Ok(BlogStatus::Published),
            "archived" => Ok(BlogStatus::Archived),
            other => Err(format!("unknown blog status: {}", other)),
        }
    }
}

/// Full blog post representation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: String,
    pub published_at: DateTime<Utc>,
    pub status: BlogStatus,
    pub category: String,
    /// Estimated reading time in minutes
    pub reading_time: i32,
    /// Handle of the owning user
    pub author: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub tags: Vec<String>,
}

/// Listing view of a blog post (no body or SEO metadata)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub cover_image: String,
    pub published_at: DateTime<Utc>,
    pub category: String,
    pub reading_time: i32,
    pub author: String,
    pub tags: Vec<String>,
}

impl From<BlogPost> for BlogSummary {
    fn from(post: BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            cover_image: post.cover_image,
            published_at: post.published_at,
            category: post.category,
            reading_time: post.reading_time,
            author: post.author,
            tags: post.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_status_round_trips_through_str() {
        for status in [BlogStatus::Draft, BlogStatus::Published, BlogStatus::Archived] {
            assert_eq!(status.as_str().parse::<BlogStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<BlogStatus>().is_err());
    }

    #[test]
    fn test_blog_status_serializes_lowercase() {
        let json = serde_json::to_string(&BlogStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }
}
