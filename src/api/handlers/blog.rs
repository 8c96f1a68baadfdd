//! Blog reader and admin handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::{ADMIN_TAG, BLOG_TAG};
use crate::api::dto::{
    BlogListQuery, BlogPostResponse, BlogPostSummary, BlogStatsResponse, CategoryResponse,
    CounterResponse, CreateBlogPostRequest, ErrorResponse, PagedResponse, RelatedQuery,
    SitemapEntry, UpdateBlogPostRequest,
};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::time::format_timestamp;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Public reader routes, mounted at `/api/blog`.
///
/// # Routes
/// - `GET /` - Published posts
/// - `GET /sitemap`
/// - `GET /categories`
/// - `GET /{slug}`
/// - `GET /{slug}/related`
/// - `POST /{slug}/view`
/// - `POST /{slug}/like`, `DELETE /{slug}/like`
pub fn blog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_posts))
        .routes(routes!(sitemap))
        .routes(routes!(list_categories))
        .routes(routes!(get_post))
        .routes(routes!(related_posts))
        .routes(routes!(record_view))
        .routes(routes!(like_post, unlike_post))
}

/// Admin routes, mounted at `/api/admin/blog`.
pub fn admin_blog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_post))
        .routes(routes!(blog_stats))
        .routes(routes!(get_post_by_id, update_post, delete_post))
}

/// GET /api/blog - List published posts
#[utoipa::path(
    get,
    path = "/",
    tag = BLOG_TAG,
    params(BlogListQuery),
    responses((status = 200, description = "Published posts", body = PagedResponse<BlogPostSummary>))
)]
async fn list_posts(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<BlogListQuery>,
) -> AppResult<Json<PagedResponse<BlogPostSummary>>> {
    let params = query.pagination();
    let (posts, total) = state
        .services
        .blog
        .list(query.into_filter(), params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(posts, &params, total)))
}

/// GET /api/blog/sitemap - Slugs of published posts
#[utoipa::path(
    get,
    path = "/sitemap",
    tag = BLOG_TAG,
    responses((status = 200, description = "Sitemap entries", body = Vec<SitemapEntry>))
)]
async fn sitemap(State(state): State<AppState>) -> AppResult<Json<Vec<SitemapEntry>>> {
    let entries = state.services.blog.sitemap().await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|(slug, updated_at)| SitemapEntry {
                slug,
                updated_at: format_timestamp(updated_at),
            })
            .collect(),
    ))
}

/// GET /api/blog/categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = BLOG_TAG,
    responses((status = 200, description = "Fixed category list", body = Vec<CategoryResponse>))
)]
async fn list_categories(State(state): State<AppState>) -> Json<Vec<CategoryResponse>> {
    Json(
        state
            .services
            .blog
            .categories()
            .iter()
            .map(|(key, name)| CategoryResponse {
                key: key.to_string(),
                name: name.to_string(),
            })
            .collect(),
    )
}

/// GET /api/blog/{slug}
#[utoipa::path(
    get,
    path = "/{slug}",
    tag = BLOG_TAG,
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Published post", body = BlogPostResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<BlogPostResponse>> {
    let post = state.services.blog.get_by_slug(&slug).await?;
    Ok(Json(post.into()))
}

/// GET /api/blog/{slug}/related - Same-category posts
#[utoipa::path(
    get,
    path = "/{slug}/related",
    tag = BLOG_TAG,
    params(("slug" = String, Path, description = "Post slug"), RelatedQuery),
    responses(
        (status = 200, description = "Related posts", body = Vec<BlogPostSummary>),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
async fn related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidatedQuery(query): ValidatedQuery<RelatedQuery>,
) -> AppResult<Json<Vec<BlogPostSummary>>> {
    let posts = state.services.blog.related(&slug, query.limit).await?;
    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// POST /api/blog/{slug}/view
#[utoipa::path(
    post,
    path = "/{slug}/view",
    tag = BLOG_TAG,
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Updated view count", body = CounterResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
async fn record_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CounterResponse>> {
    let count = state.services.blog.record_view(&slug).await?;
    Ok(Json(CounterResponse { count }))
}

/// POST /api/blog/{slug}/like
#[utoipa::path(
    post,
    path = "/{slug}/like",
    tag = BLOG_TAG,
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Updated like count", body = CounterResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
async fn like_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CounterResponse>> {
    let count = state.services.blog.like(&slug).await?;
    Ok(Json(CounterResponse { count }))
}

/// DELETE /api/blog/{slug}/like - Never drops below zero
#[utoipa::path(
    delete,
    path = "/{slug}/like",
    tag = BLOG_TAG,
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Updated like count", body = CounterResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
async fn unlike_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CounterResponse>> {
    let count = state.services.blog.unlike(&slug).await?;
    Ok(Json(CounterResponse { count }))
}

/// POST /api/admin/blog
#[utoipa::path(
    post,
    path = "/",
    tag = ADMIN_TAG,
    request_body = CreateBlogPostRequest,
    responses(
        (status = 201, description = "Post created", body = BlogPostResponse),
        (status = 409, description = "Slug already used", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_post(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBlogPostRequest>,
) -> AppResult<(StatusCode, Json<BlogPostResponse>)> {
    let post = state.services.blog.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// GET /api/admin/blog/stats
#[utoipa::path(
    get,
    path = "/stats",
    tag = ADMIN_TAG,
    responses((status = 200, description = "Blog statistics", body = BlogStatsResponse)),
    security(("bearerAuth" = []))
)]
async fn blog_stats(State(state): State<AppState>) -> AppResult<Json<BlogStatsResponse>> {
    let stats = state.services.blog.stats().await?;
    Ok(Json(stats.into()))
}

/// GET /api/admin/blog/{id} - Any status
#[utoipa::path(
    get,
    path = "/{id}",
    tag = ADMIN_TAG,
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post found", body = BlogPostResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_post_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BlogPostResponse>> {
    let post = state.services.blog.get_by_id(&id).await?;
    Ok(Json(post.into()))
}

/// PUT /api/admin/blog/{id}
#[utoipa::path(
    put,
    path = "/{id}",
    tag = ADMIN_TAG,
    params(("id" = String, Path, description = "Post ID")),
    request_body = UpdateBlogPostRequest,
    responses(
        (status = 200, description = "Post updated", body = BlogPostResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 409, description = "Slug already used", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateBlogPostRequest>,
) -> AppResult<Json<BlogPostResponse>> {
    let post = state.services.blog.update(&id, payload.into()).await?;
    Ok(Json(post.into()))
}

/// DELETE /api/admin/blog/{id}
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = ADMIN_TAG,
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.blog.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
