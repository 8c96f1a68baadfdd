//! Article editing and publish handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::ARTICLE_TAG;
use crate::api::dto::{
    ArticleResponse, CreateArticleRequest, ErrorResponse, PagedResponse, PaginationParams,
    PublishAcceptedResponse, PublishArticleRequest, PublishStatusResponse, UpdateArticleRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::ArticleStatus;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the article routes, mounted at `/api/articles`. All owner only.
///
/// # Routes
/// - `POST /`, `GET /`
/// - `GET /{id}`, `PUT /{id}`, `DELETE /{id}`
/// - `PUT /{id}/publish` - Start a background publish
/// - `GET /{id}/publish-status`
pub fn article_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_article, list_articles))
        .routes(routes!(get_article, update_article, delete_article))
        .routes(routes!(publish_article))
        .routes(routes!(publish_status))
}

/// POST /api/articles
#[utoipa::path(
    post,
    path = "/",
    tag = ARTICLE_TAG,
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created in editing state", body = ArticleResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_article(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateArticleRequest>,
) -> AppResult<(StatusCode, Json<ArticleResponse>)> {
    let article = state
        .services
        .articles
        .create(&auth_user.user_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(article.into())))
}

/// GET /api/articles
#[utoipa::path(
    get,
    path = "/",
    tag = ARTICLE_TAG,
    params(PaginationParams),
    responses((status = 200, description = "Caller's articles", body = PagedResponse<ArticleResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_articles(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<PagedResponse<ArticleResponse>>> {
    let (articles, total) = state
        .services
        .articles
        .list(&auth_user.user_id, params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(articles, &params, total)))
}

/// GET /api/articles/{id}
#[utoipa::path(
    get,
    path = "/{id}",
    tag = ARTICLE_TAG,
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article found", body = ArticleResponse),
        (status = 403, description = "Article belongs to another user", body = ErrorResponse),
        (status = 404, description = "Article not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_article(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ArticleResponse>> {
    let article = state.services.articles.get(&auth_user.user_id, id).await?;
    Ok(Json(article.into()))
}

/// PUT /api/articles/{id}
#[utoipa::path(
    put,
    path = "/{id}",
    tag = ARTICLE_TAG,
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 403, description = "Article belongs to another user", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_article(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateArticleRequest>,
) -> AppResult<Json<ArticleResponse>> {
    let article = state
        .services
        .articles
        .update(&auth_user.user_id, id, payload.into())
        .await?;
    Ok(Json(article.into()))
}

/// DELETE /api/articles/{id}
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = ARTICLE_TAG,
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 403, description = "Article belongs to another user", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_article(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.articles.delete(&auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/articles/{id}/publish
///
/// Responds before the publish finishes; poll `publish-status` for the
/// outcome.
#[utoipa::path(
    put,
    path = "/{id}/publish",
    tag = ARTICLE_TAG,
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = PublishArticleRequest,
    responses(
        (status = 202, description = "Publish started", body = PublishAcceptedResponse),
        (status = 403, description = "Article belongs to another user", body = ErrorResponse),
        (status = 404, description = "Article not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn publish_article(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PublishArticleRequest>,
) -> AppResult<(StatusCode, Json<PublishAcceptedResponse>)> {
    let task_id = state
        .services
        .articles
        .publish(&auth_user.user_id, id, payload.into())
        .await?;
    let response = PublishAcceptedResponse {
        task_id,
        status: ArticleStatus::Pending,
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /api/articles/{id}/publish-status
#[utoipa::path(
    get,
    path = "/{id}/publish-status",
    tag = ARTICLE_TAG,
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Current publish state", body = PublishStatusResponse),
        (status = 404, description = "Article not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn publish_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublishStatusResponse>> {
    let status = state
        .services
        .articles
        .publish_status(&auth_user.user_id, id)
        .await?;
    Ok(Json(status.into()))
}
