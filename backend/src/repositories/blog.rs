//! Blog post and tag repository for database operations

use super::{conflict_or, PgStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_shared::types::BlogFilter;
use quill_shared::{BlogPost, BlogStatus};
use sqlx::PgConnection;
use uuid::Uuid;

const SLUG_TAKEN: &str = "a blog with this title already exists";

/// Columns selected for every blog read; tags come back sorted by name
const BLOG_COLUMNS: &str = r#"
    b.id, b.title, b.slug, b.content, b.excerpt, b.cover_image, b.published_at,
    b.status, b.category, b.reading_time, b.author, b.meta_description, b.meta_keywords,
    ARRAY(
        SELECT t.name
        FROM blog_tags t
        JOIN blog_post_tags pt ON pt.tag_id = t.id
        WHERE pt.blog_id = b.id
        ORDER BY t.name
    ) AS tags
"#;

/// Blog record from database
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BlogRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: String,
    pub published_at: DateTime<Utc>,
    pub status: String,
    pub category: String,
    pub reading_time: i32,
    pub author: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub tags: Vec<String>,
}

impl BlogRecord {
    pub fn status(&self) -> BlogStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn is_published(&self) -> bool {
        self.status() == BlogStatus::Published
    }
}

impl From<BlogRecord> for BlogPost {
    fn from(record: BlogRecord) -> Self {
        let status = record.status();
        Self {
            id: record.id,
            title: record.title,
            slug: record.slug,
            content: record.content,
            excerpt: record.excerpt,
            cover_image: record.cover_image,
            published_at: record.published_at,
            status,
            category: record.category,
            reading_time: record.reading_time,
            author: record.author,
            meta_description: record.meta_description,
            meta_keywords: record.meta_keywords,
            tags: record.tags,
        }
    }
}

/// Blog persistence
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a post with its tags; a duplicate slug is a `Conflict`
    async fn create_blog(&self, blog: BlogRecord) -> StoreResult<BlogRecord>;

    async fn find_blog_by_id(&self, id: Uuid) -> StoreResult<Option<BlogRecord>>;

    /// Slug lookup restricted to published posts
    async fn find_published_blog_by_slug(&self, slug: &str) -> StoreResult<Option<BlogRecord>>;

    /// Published posts, newest first
    async fn list_published_blogs(&self, filter: &BlogFilter) -> StoreResult<Vec<BlogRecord>>;

    /// Overwrite every mutable field and replace the tag set
    async fn update_blog(&self, blog: &BlogRecord) -> StoreResult<BlogRecord>;

    async fn delete_blog(&self, id: Uuid) -> StoreResult<()>;

    /// Attach a tag, creating it if needed; attaching twice is a no-op
    async fn add_blog_tag(&self, id: Uuid, tag: &str) -> StoreResult<()>;

    async fn remove_blog_tag(&self, id: Uuid, tag: &str) -> StoreResult<()>;
}

async fn attach_tag(conn: &mut PgConnection, blog_id: Uuid, tag: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO blog_tags (name)
        VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(tag)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO blog_post_tags (blog_id, tag_id)
        SELECT $1, id FROM blog_tags WHERE name = $2
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(blog_id)
    .bind(tag)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn fetch_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<BlogRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM blogs b WHERE b.id = $1", BLOG_COLUMNS);
    sqlx::query_as::<_, BlogRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

#[async_trait]
impl BlogStore for PgStore {
    async fn create_blog(&self, blog: BlogRecord) -> StoreResult<BlogRecord> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO blogs (
                id, title, slug, content, excerpt, cover_image, published_at, status,
                category, reading_time, author, meta_description, meta_keywords
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(blog.id)
        .bind(&blog.title)
        .bind(&blog.slug)
        .bind(&blog.content)
        .bind(&blog.excerpt)
        .bind(&blog.cover_image)
        .bind(blog.published_at)
        .bind(&blog.status)
        .bind(&blog.category)
        .bind(blog.reading_time)
        .bind(&blog.author)
        .bind(&blog.meta_description)
        .bind(&blog.meta_keywords)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, SLUG_TAKEN))?;

        for tag in &blog.tags {
            attach_tag(&mut tx, blog.id, tag).await?;
        }

        let created = fetch_by_id(&mut tx, blog.id)
            .await?
            .ok_or(StoreError::NotFound("blog"))?;
        tx.commit().await?;

        Ok(created)
    }

    async fn find_blog_by_id(&self, id: Uuid) -> StoreResult<Option<BlogRecord>> {
        let mut conn = self.pool().acquire().await?;
        Ok(fetch_by_id(&mut conn, id).await?)
    }

    async fn find_published_blog_by_slug(&self, slug: &str) -> StoreResult<Option<BlogRecord>> {
        let sql = format!(
            "SELECT {} FROM blogs b WHERE b.slug = $1 AND b.status = 'published'",
            BLOG_COLUMNS
        );
        let blog = sqlx::query_as::<_, BlogRecord>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await?;

        Ok(blog)
    }

    async fn list_published_blogs(&self, filter: &BlogFilter) -> StoreResult<Vec<BlogRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM blogs b
            WHERE b.status = 'published'
              AND ($1::TEXT IS NULL OR b.category = $1)
            ORDER BY b.published_at DESC, b.id
            LIMIT $2 OFFSET $3
            "#,
            BLOG_COLUMNS
        );
        let blogs = sqlx::query_as::<_, BlogRecord>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.limit)
            .bind(filter.offset())
            .fetch_all(self.pool())
            .await?;

        Ok(blogs)
    }

    async fn update_blog(&self, blog: &BlogRecord) -> StoreResult<BlogRecord> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE blogs SET
                title = $2,
                slug = $3,
                content = $4,
                excerpt = $5,
                cover_image = $6,
                published_at = $7,
                status = $8,
                category = $9,
                reading_time = $10,
                meta_description = $11,
                meta_keywords = $12,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(blog.id)
        .bind(&blog.title)
        .bind(&blog.slug)
        .bind(&blog.content)
        .bind(&blog.excerpt)
        .bind(&blog.cover_image)
        .bind(blog.published_at)
        .bind(&blog.status)
        .bind(&blog.category)
        .bind(blog.reading_time)
        .bind(&blog.meta_description)
        .bind(&blog.meta_keywords)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, SLUG_TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("blog"));
        }

        sqlx::query("DELETE FROM blog_post_tags WHERE blog_id = $1")
            .bind(blog.id)
            .execute(&mut *tx)
            .await?;
        for tag in &blog.tags {
            attach_tag(&mut tx, blog.id, tag).await?;
        }

        let updated = fetch_by_id(&mut tx, blog.id)
            .await?
            .ok_or(StoreError::NotFound("blog"))?;
        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<()> {
        // blog_post_tags rows go with the post via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("blog"));
        }
        Ok(())
    }

    async fn add_blog_tag(&self, id: Uuid, tag: &str) -> StoreResult<()> {
        let mut tx = self.pool().begin().await?;
        if fetch_by_id(&mut tx, id).await?.is_none() {
            return Err(StoreError::NotFound("blog"));
        }
        attach_tag(&mut tx, id, tag).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_blog_tag(&self, id: Uuid, tag: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM blog_post_tags pt
            USING blog_tags t
            WHERE pt.tag_id = t.id
              AND pt.blog_id = $1
              AND t.name = $2
            "#,
        )
        .bind(id)
        .bind(tag)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("tag"));
        }
        Ok(())
    }
}
