//! In-memory store
//!
//! Implements every store trait over hash maps behind a single lock. Used by
//! the test suites and handy for running the API without Postgres.

use super::{
    BlogRecord, BlogStore, NewUser, PersonalizationInput, PersonalizationRecord,
    PersonalizationStore, Store, StoreError, StoreResult, UserRecord, UserStore,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use quill_shared::types::BlogFilter;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    blogs: HashMap<Uuid, BlogRecord>,
    personalizations: HashMap<String, PersonalizationRecord>,
}

/// Cheaply cloneable in-memory store; clones share the same tables
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags.dedup();
    tags
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write();
        if tables.users.contains_key(&user.handle)
            || tables.users.values().any(|u| u.email == user.email)
        {
            return Err(StoreError::Conflict(
                "user with this handle or email already exists".to_string(),
            ));
        }

        let record = UserRecord {
            handle: user.handle,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(record.handle.clone(), record.clone());
        Ok(record)
    }

    async fn find_user_by_handle(&self, handle: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().users.get(handle).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_blog(&self, mut blog: BlogRecord) -> StoreResult<BlogRecord> {
        let mut tables = self.tables.write();
        if tables.blogs.values().any(|b| b.slug == blog.slug) {
            return Err(StoreError::Conflict(
                "a blog with this title already exists".to_string(),
            ));
        }

        blog.tags = sorted(blog.tags);
        tables.blogs.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn find_blog_by_id(&self, id: Uuid) -> StoreResult<Option<BlogRecord>> {
        Ok(self.tables.read().blogs.get(&id).cloned())
    }

    async fn find_published_blog_by_slug(&self, slug: &str) -> StoreResult<Option<BlogRecord>> {
        Ok(self
            .tables
            .read()
            .blogs
            .values()
            .find(|b| b.slug == slug && b.is_published())
            .cloned())
    }

    async fn list_published_blogs(&self, filter: &BlogFilter) -> StoreResult<Vec<BlogRecord>> {
        let tables = self.tables.read();
        let mut blogs: Vec<BlogRecord> = tables
            .blogs
            .values()
            .filter(|b| b.is_published())
            .filter(|b| filter.category.as_deref().map_or(true, |c| b.category == c))
            .cloned()
            .collect();
        blogs.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(a.id.cmp(&b.id)));

        Ok(blogs
            .into_iter()
            .skip(filter.offset().max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn update_blog(&self, blog: &BlogRecord) -> StoreResult<BlogRecord> {
        let mut tables = self.tables.write();
        if !tables.blogs.contains_key(&blog.id) {
            return Err(StoreError::NotFound("blog"));
        }
        if tables
            .blogs
            .values()
            .any(|b| b.id != blog.id && b.slug == blog.slug)
        {
            return Err(StoreError::Conflict(
                "a blog with this title already exists".to_string(),
            ));
        }

        let mut updated = blog.clone();
        updated.tags = sorted(updated.tags);
        tables.blogs.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .blogs
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("blog"))
    }

    async fn add_blog_tag(&self, id: Uuid, tag: &str) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let blog = tables.blogs.get_mut(&id).ok_or(StoreError::NotFound("blog"))?;
        if !blog.tags.iter().any(|t| t == tag) {
            blog.tags.push(tag.to_string());
            blog.tags.sort();
        }
        Ok(())
    }

    async fn remove_blog_tag(&self, id: Uuid, tag: &str) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let blog = tables.blogs.get_mut(&id).ok_or(StoreError::NotFound("blog"))?;
        let before = blog.tags.len();
        blog.tags.retain(|t| t != tag);
        if blog.tags.len() == before {
            return Err(StoreError::NotFound("tag"));
        }
        Ok(())
    }
}

#[async_trait]
impl PersonalizationStore for MemoryStore {
    async fn find_personalization(&self, handle: &str) -> StoreResult<Option<PersonalizationRecord>> {
        Ok(self.tables.read().personalizations.get(handle).cloned())
    }

    async fn create_personalization(
        &self,
        input: PersonalizationInput,
    ) -> StoreResult<PersonalizationRecord> {
        let mut tables = self.tables.write();
        if tables.personalizations.contains_key(&input.handle) {
            return Err(StoreError::Conflict(
                "personalization already exists".to_string(),
            ));
        }

        let record = PersonalizationRecord {
            handle: input.handle,
            description: input.description,
            photo: input.photo,
            updated_at: Utc::now(),
        };
        tables
            .personalizations
            .insert(record.handle.clone(), record.clone());
        Ok(record)
    }

    async fn update_personalization(
        &self,
        input: PersonalizationInput,
    ) -> StoreResult<PersonalizationRecord> {
        let mut tables = self.tables.write();
        let record = tables
            .personalizations
            .get_mut(&input.handle)
            .ok_or(StoreError::NotFound("personalization"))?;

        record.description = input.description;
        record.photo = input.photo;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(handle: &str, email: &str) -> NewUser {
        NewUser {
            handle: handle.to_string(),
            name: handle.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn blog(slug: &str, status: &str, minutes_ago: i64) -> BlogRecord {
        BlogRecord {
            id: Uuid::new_v4(),
            title: slug.to_string(),
            slug: slug.to_string(),
            content: "body".to_string(),
            excerpt: String::new(),
            cover_image: String::new(),
            published_at: Utc::now() - Duration::minutes(minutes_ago),
            status: status.to_string(),
            category: "rust".to_string(),
            reading_time: 3,
            author: "alice".to_string(),
            meta_description: String::new(),
            meta_keywords: String::new(),
            tags: vec!["web".to_string(), "axum".to_string()],
        }
    }

    fn filter(page: i64, limit: i64) -> BlogFilter {
        BlogFilter {
            page,
            limit,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", "a@x.com")).await.unwrap();

        let same_email = store.create_user(new_user("alice2", "a@x.com")).await;
        assert!(matches!(same_email, Err(StoreError::Conflict(_))));

        let same_handle = store.create_user(new_user("alice", "b@x.com")).await;
        assert!(matches!(same_handle, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.create_user(new_user("alice", "a@x.com")).await.unwrap();

        assert!(clone.find_user_by_email("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_tags_come_back_sorted() {
        let store = MemoryStore::new();
        let created = store.create_blog(blog("post", "draft", 0)).await.unwrap();
        assert_eq!(created.tags, vec!["axum", "web"]);

        store.add_blog_tag(created.id, "async").await.unwrap();
        store.add_blog_tag(created.id, "async").await.unwrap();
        let found = store.find_blog_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.tags, vec!["async", "axum", "web"]);
    }

    #[tokio::test]
    async fn test_remove_missing_tag_is_not_found() {
        let store = MemoryStore::new();
        let created = store.create_blog(blog("post", "draft", 0)).await.unwrap();

        let result = store.remove_blog_tag(created.id, "python").await;
        assert!(matches!(result, Err(StoreError::NotFound("tag"))));
    }

    #[tokio::test]
    async fn test_listing_excludes_drafts_and_orders_newest_first() {
        let store = MemoryStore::new();
        store.create_blog(blog("old", "published", 30)).await.unwrap();
        store.create_blog(blog("new", "published", 1)).await.unwrap();
        store.create_blog(blog("hidden", "draft", 0)).await.unwrap();

        let slugs: Vec<String> = store
            .list_published_blogs(&filter(1, 10))
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.slug)
            .collect();
        assert_eq!(slugs, vec!["new", "old"]);

        let second_page = store.list_published_blogs(&filter(2, 1)).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].slug, "old");

        assert!(store
            .find_published_blog_by_slug("hidden")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_slug_collision() {
        let store = MemoryStore::new();
        store.create_blog(blog("first", "draft", 0)).await.unwrap();
        let mut second = store.create_blog(blog("second", "draft", 0)).await.unwrap();

        second.slug = "first".to_string();
        assert!(matches!(
            store.update_blog(&second).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_personalization_create_then_update() {
        let store = MemoryStore::new();
        let input = PersonalizationInput {
            handle: "alice".to_string(),
            description: "hi".to_string(),
            photo: String::new(),
        };

        assert!(matches!(
            store.update_personalization(input.clone()).await,
            Err(StoreError::NotFound(_))
        ));
        store.create_personalization(input.clone()).await.unwrap();
        assert!(matches!(
            store.create_personalization(input.clone()).await,
            Err(StoreError::Conflict(_))
        ));

        let updated = store
            .update_personalization(PersonalizationInput {
                description: "hello".to_string(),
                ..input
            })
            .await
            .unwrap();
        assert_eq!(updated.description, "hello");
    }
}
