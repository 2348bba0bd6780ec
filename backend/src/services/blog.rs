//! Blog service: public reads and owner-only writes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{BlogRecord, BlogStore};
use chrono::Utc;
use quill_shared::types::{BlogListQuery, BlogListResponse, CreateBlogRequest, UpdateBlogRequest};
use quill_shared::validation::normalize_tags;
use quill_shared::{generate_slug, BlogPost, BlogStatus, BlogSummary};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const BLOG_NOT_FOUND: &str = "blog not found";

fn not_found() -> ApiError {
    ApiError::NotFound(BLOG_NOT_FOUND.to_string())
}

/// Parse a path id; anything that is not a UUID cannot name a post
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| not_found())
}

fn slug_for(title: &str) -> Result<String, ApiError> {
    let slug = generate_slug(title);
    if slug.is_empty() {
        return Err(ApiError::Validation(
            "title must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

/// Replace `field` when the update carries a non-empty value
fn overwrite(field: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *field = value;
    }
}

pub struct BlogService;

impl BlogService {
    /// Published posts, newest first
    pub async fn list<B: BlogStore + ?Sized>(
        blogs: &B,
        query: BlogListQuery,
    ) -> Result<BlogListResponse, ApiError> {
        let filter = query.normalize();
        let records = blogs.list_published_blogs(&filter).await?;

        Ok(BlogListResponse {
            items: records
                .into_iter()
                .map(|record| BlogSummary::from(BlogPost::from(record)))
                .collect(),
            page: filter.page,
            limit: filter.limit,
        })
    }

    /// Published post by slug; drafts are indistinguishable from missing posts
    pub async fn get_by_slug<B: BlogStore + ?Sized>(
        blogs: &B,
        slug: &str,
    ) -> Result<BlogPost, ApiError> {
        blogs
            .find_published_blog_by_slug(slug)
            .await?
            .map(BlogPost::from)
            .ok_or_else(not_found)
    }

    /// Create a draft owned by the caller
    pub async fn create<B: BlogStore + ?Sized>(
        blogs: &B,
        caller: &AuthUser,
        request: CreateBlogRequest,
    ) -> Result<BlogPost, ApiError> {
        request.validate()?;
        let slug = slug_for(&request.title)?;

        let record = BlogRecord {
            id: Uuid::new_v4(),
            title: request.title,
            slug,
            content: request.content,
            excerpt: request.excerpt,
            cover_image: request.cover_image,
            published_at: Utc::now(),
            status: BlogStatus::Draft.to_string(),
            category: request.category,
            reading_time: request.reading_time,
            author: caller.handle.clone(),
            meta_description: request.meta_description,
            meta_keywords: request.meta_keywords,
            tags: normalize_tags(&request.tags),
        };

        let created = blogs.create_blog(record).await?;
        info!(id = %created.id, author = %created.author, "Blog created");
        Ok(created.into())
    }

    /// Apply a partial update; only the owner may do this
    ///
    /// Empty strings and absent fields keep the stored value. A new title
    /// regenerates the slug, and moving into `published` stamps
    /// `published_at`.
    pub async fn update<B: BlogStore + ?Sized>(
        blogs: &B,
        caller: &AuthUser,
        id: &str,
        request: UpdateBlogRequest,
    ) -> Result<BlogPost, ApiError> {
        let id = parse_id(id)?;
        let mut record = blogs.find_blog_by_id(id).await?.ok_or_else(not_found)?;
        caller.ensure_owner(&record.author, "update this blog")?;
        request.validate()?;

        if let Some(title) = request.title.filter(|t| !t.is_empty()) {
            if title != record.title {
                record.slug = slug_for(&title)?;
                record.title = title;
            }
        }
        overwrite(&mut record.content, request.content);
        overwrite(&mut record.excerpt, request.excerpt);
        overwrite(&mut record.cover_image, request.cover_image);
        overwrite(&mut record.category, request.category);
        overwrite(&mut record.meta_description, request.meta_description);
        overwrite(&mut record.meta_keywords, request.meta_keywords);
        if let Some(minutes) = request.reading_time.filter(|m| *m != 0) {
            record.reading_time = minutes;
        }
        if let Some(status) = request.status {
            if status == BlogStatus::Published && !record.is_published() {
                record.published_at = Utc::now();
            }
            record.status = status.to_string();
        }
        if let Some(tags) = request.tags {
            let tags = normalize_tags(&tags);
            if !tags.is_empty() {
                record.tags = tags;
            }
        }

        let updated = blogs.update_blog(&record).await?;
        info!(id = %updated.id, "Blog updated");
        Ok(updated.into())
    }

    /// Delete a post; only the owner may do this
    pub async fn delete<B: BlogStore + ?Sized>(
        blogs: &B,
        caller: &AuthUser,
        id: &str,
    ) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        let record = blogs.find_blog_by_id(id).await?.ok_or_else(not_found)?;
        caller.ensure_owner(&record.author, "delete this blog")?;

        blogs.delete_blog(id).await?;
        info!(id = %id, "Blog deleted");
        Ok(())
    }

    /// Attach a tag to an owned post and return the post's tags
    pub async fn add_tag<B: BlogStore + ?Sized>(
        blogs: &B,
        caller: &AuthUser,
        id: &str,
        tag: &str,
    ) -> Result<Vec<String>, ApiError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ApiError::Validation("tag cannot be empty".to_string()));
        }

        let id = parse_id(id)?;
        let record = blogs.find_blog_by_id(id).await?.ok_or_else(not_found)?;
        caller.ensure_owner(&record.author, "tag this blog")?;

        blogs.add_blog_tag(id, tag).await?;
        Self::tags_of(blogs, id).await
    }

    /// Detach a tag from an owned post and return the remaining tags
    pub async fn remove_tag<B: BlogStore + ?Sized>(
        blogs: &B,
        caller: &AuthUser,
        id: &str,
        tag: &str,
    ) -> Result<Vec<String>, ApiError> {
        let id = parse_id(id)?;
        let record = blogs.find_blog_by_id(id).await?.ok_or_else(not_found)?;
        caller.ensure_owner(&record.author, "untag this blog")?;

        blogs.remove_blog_tag(id, tag).await?;
        Self::tags_of(blogs, id).await
    }

    async fn tags_of<B: BlogStore + ?Sized>(blogs: &B, id: Uuid) -> Result<Vec<String>, ApiError> {
        Ok(blogs
            .find_blog_by_id(id)
            .await?
            .ok_or_else(not_found)?
            .tags)
    }
}
