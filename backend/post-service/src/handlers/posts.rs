/// Post handlers - HTTP endpoints for the posts resource
use crate::config::MAX_CHUNK_SIZE;
use crate::error::{AppError, Result};
use crate::models::{NewPost, Post, PostChanges, PostForm, ReadingTime};
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

const DEFAULT_PAGE_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    /// Overrides the configured batch size for this scan
    pub chunk_size: Option<i64>,
}

/// Scan every post in id order, batch by batch, and report the walk
/// GET /api/v1/posts
pub async fn index(
    service: web::Data<PostService>,
    query: web::Query<IndexParams>,
) -> Result<HttpResponse> {
    if let Some(size) = query.chunk_size {
        if !(1..=MAX_CHUNK_SIZE).contains(&size) {
            return Err(AppError::BadRequest(format!(
                "chunk_size must be between 1 and {}",
                MAX_CHUNK_SIZE
            )));
        }
    }

    let scan = service.scan_in_chunks(query.chunk_size).await?;
    Ok(HttpResponse::Ok().json(scan))
}

/// Field schema for a new post
/// GET /api/v1/posts/create
pub async fn create() -> HttpResponse {
    HttpResponse::Ok().json(PostForm::for_create())
}

/// Create a new post
/// POST /api/v1/posts
pub async fn store(
    service: web::Data<PostService>,
    req: web::Json<NewPost>,
) -> Result<HttpResponse> {
    let post = service.create_post(&req).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
/// GET /api/v1/posts/{post_id}
pub async fn show(service: web::Data<PostService>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    match service.get_post(post_id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Err(AppError::post_not_found(post_id)),
    }
}

/// Field schema prefilled with the current post
/// GET /api/v1/posts/{post_id}/edit
pub async fn edit(service: web::Data<PostService>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    match service.get_post_for_edit(post_id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(PostForm::for_edit(post))),
        None => Err(AppError::post_not_found(post_id)),
    }
}

/// Update the fields present in the body
/// PUT|PATCH /api/v1/posts/{post_id}
pub async fn update(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
    req: web::Json<PostChanges>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    match service.update_post(post_id, &req).await? {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Err(AppError::post_not_found(post_id)),
    }
}

/// Delete a post
/// DELETE /api/v1/posts/{post_id}
pub async fn destroy(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    if service.delete_post(post_id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::post_not_found(post_id))
    }
}

#[derive(Debug, Serialize)]
pub struct ReadingTimeResponse {
    pub users: Vec<ReadingTime>,
}

/// Average minutes to read per author
/// GET /api/v1/posts/reading-time
pub async fn reading_time(service: web::Data<PostService>) -> Result<HttpResponse> {
    let users = service.reading_time_by_user().await?;
    Ok(HttpResponse::Ok().json(ReadingTimeResponse { users }))
}

/// Pagination query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct PageParams {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PostPageResponse {
    pub posts: Vec<Post>,
    pub total: i64,
    pub has_more: bool,
}

/// One page of posts ordered by id
/// GET /api/v1/posts/page
pub async fn page(
    service: web::Data<PostService>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    query.validate()?;

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let (posts, total) = service.list_posts(limit, offset).await?;

    Ok(HttpResponse::Ok().json(PostPageResponse {
        has_more: offset + (posts.len() as i64) < total,
        posts,
        total,
    }))
}
