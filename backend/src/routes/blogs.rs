//! Blog routes
//!
//! Reads are public and only ever expose published posts. Writes take the
//! caller from the [`AuthUser`] extractor and are owner-only.
//!
//! `/blogs/:key` is a slug for GET and a post id for PUT and DELETE.

use super::{ApiJson, ApiQuery};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::repositories::Store;
use crate::services::BlogService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use quill_shared::types::{
    BlogListQuery, BlogListResponse, CreateBlogRequest, MessageResponse, TagRequest,
    UpdateBlogRequest,
};
use quill_shared::BlogPost;
use serde::Serialize;
use validator::Validate;

/// Tag set of a post after a tag change
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// Create blog routes
pub fn blog_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/blogs", get(list_blogs::<S>).post(create_blog::<S>))
        .route(
            "/blogs/:key",
            get(get_blog::<S>).put(update_blog::<S>).delete(delete_blog::<S>),
        )
        .route("/blogs/:key/tags", post(add_tag::<S>))
        .route("/blogs/:key/tags/:tag", delete(remove_tag::<S>))
}

/// GET /api/v1/blogs?page=&limit=&category=
async fn list_blogs<S: Store>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<BlogListQuery>,
) -> ApiResult<Json<BlogListResponse>> {
    Ok(Json(BlogService::list(state.store(), query).await?))
}

/// GET /api/v1/blogs/:slug
async fn get_blog<S: Store>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<BlogPost>> {
    Ok(Json(BlogService::get_by_slug(state.store(), &slug).await?))
}

/// POST /api/v1/blogs
async fn create_blog<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateBlogRequest>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    let post = BlogService::create(state.store(), &user, req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/v1/blogs/:id
async fn update_blog<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateBlogRequest>,
) -> ApiResult<Json<BlogPost>> {
    Ok(Json(BlogService::update(state.store(), &user, &id, req).await?))
}

/// DELETE /api/v1/blogs/:id
async fn delete_blog<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    BlogService::delete(state.store(), &user, &id).await?;
    Ok(Json(MessageResponse {
        message: "blog deleted successfully".to_string(),
    }))
}

/// POST /api/v1/blogs/:id/tags
async fn add_tag<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TagRequest>,
) -> ApiResult<Json<TagsResponse>> {
    req.validate()?;
    let tags = BlogService::add_tag(state.store(), &user, &id, &req.tag).await?;
    Ok(Json(TagsResponse { tags }))
}

/// DELETE /api/v1/blogs/:id/tags/:tag
async fn remove_tag<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    Path((id, tag)): Path<(String, String)>,
) -> ApiResult<Json<TagsResponse>> {
    let tags = BlogService::remove_tag(state.store(), &user, &id, &tag).await?;
    Ok(Json(TagsResponse { tags }))
}
