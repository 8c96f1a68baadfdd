//! Template gallery handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::{ADMIN_TAG, TEMPLATE_TAG};
use crate::api::dto::{
    CreateTemplateRequest, ErrorResponse, PagedResponse, PaginationParams, TemplateQuery,
    TemplateResponse, TemplateStatusRequest, UpdateTemplateRequest, UseCountResponse,
};
use crate::api::middleware::{AuthUser, MaybeAuthUser};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Gallery routes with optional authentication, mounted at `/api/templates`.
///
/// # Routes
/// - `GET /` - Public approved templates
/// - `GET /{id}` - One template; private ones only for the creator
/// - `GET /shared/{share_code}`
pub fn public_template_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_templates))
        .routes(routes!(get_template))
        .routes(routes!(get_shared_template))
}

/// Authenticated gallery routes, mounted at `/api/templates`.
pub fn template_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(use_template))
}

/// The caller's own templates, mounted at `/api/me/templates`.
///
/// # Routes
/// - `POST /`, `GET /`
/// - `PUT /{id}`, `DELETE /{id}`
/// - `POST /{id}/publish` - Submit for review
/// - `POST /{id}/share` - Generate a share code
pub fn my_template_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_template, list_my_templates))
        .routes(routes!(update_template, delete_template))
        .routes(routes!(publish_template))
        .routes(routes!(share_template))
}

/// Admin routes, mounted at `/api/admin/templates`.
pub fn admin_template_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_official_template))
        .routes(routes!(set_template_status))
}

/// GET /api/templates - Browse the gallery
#[utoipa::path(
    get,
    path = "/",
    tag = TEMPLATE_TAG,
    params(PaginationParams, TemplateQuery),
    responses((status = 200, description = "Public approved templates", body = PagedResponse<TemplateResponse>))
)]
async fn list_templates(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<TemplateQuery>,
) -> AppResult<Json<PagedResponse<TemplateResponse>>> {
    let (templates, total) = state
        .services
        .templates
        .list_public(query.into(), params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(templates, &params, total)))
}

/// GET /api/templates/{id}
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TEMPLATE_TAG,
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template found", body = TemplateResponse),
        (status = 404, description = "Template not found or not visible", body = ErrorResponse)
    )
)]
async fn get_template(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<TemplateResponse>> {
    let template = state.services.templates.get(viewer.user_id(), &id).await?;
    Ok(Json(template.into()))
}

/// GET /api/templates/shared/{share_code}
#[utoipa::path(
    get,
    path = "/shared/{share_code}",
    tag = TEMPLATE_TAG,
    params(("share_code" = String, Path, description = "Share code")),
    responses(
        (status = 200, description = "Shared template", body = TemplateResponse),
        (status = 404, description = "Unknown share code", body = ErrorResponse)
    )
)]
async fn get_shared_template(
    State(state): State<AppState>,
    Path(share_code): Path<String>,
) -> AppResult<Json<TemplateResponse>> {
    let template = state.services.templates.get_shared(&share_code).await?;
    Ok(Json(template.into()))
}

/// POST /api/templates/{id}/use - Count a use
#[utoipa::path(
    post,
    path = "/{id}/use",
    tag = TEMPLATE_TAG,
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Updated use count", body = UseCountResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn use_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UseCountResponse>> {
    let use_count = state.services.templates.record_use(&id).await?;
    Ok(Json(UseCountResponse { use_count }))
}

/// POST /api/me/templates - Create a private draft
#[utoipa::path(
    post,
    path = "/",
    tag = TEMPLATE_TAG,
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_template(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateTemplateRequest>,
) -> AppResult<(StatusCode, Json<TemplateResponse>)> {
    let template = state
        .services
        .templates
        .create(&auth_user.user_id, payload.into_draft()?)
        .await?;
    Ok((StatusCode::CREATED, Json(template.into())))
}

/// GET /api/me/templates
#[utoipa::path(
    get,
    path = "/",
    tag = TEMPLATE_TAG,
    params(PaginationParams),
    responses((status = 200, description = "Caller's templates", body = PagedResponse<TemplateResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_my_templates(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<PagedResponse<TemplateResponse>>> {
    let (templates, total) = state
        .services
        .templates
        .list_mine(&auth_user.user_id, params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(templates, &params, total)))
}

/// PUT /api/me/templates/{id}
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TEMPLATE_TAG,
    params(("id" = String, Path, description = "Template ID")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 403, description = "Not the creator", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_template(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateTemplateRequest>,
) -> AppResult<Json<TemplateResponse>> {
    let template = state
        .services
        .templates
        .update(&auth_user.user_id, &id, payload.into())
        .await?;
    Ok(Json(template.into()))
}

/// DELETE /api/me/templates/{id}
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TEMPLATE_TAG,
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 403, description = "Not the creator", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_template(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.templates.delete(&auth_user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/me/templates/{id}/publish - Submit for review
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = TEMPLATE_TAG,
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template is public and pending review", body = TemplateResponse),
        (status = 403, description = "Not the creator", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn publish_template(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<TemplateResponse>> {
    let template = state.services.templates.publish(&auth_user.user_id, &id).await?;
    Ok(Json(template.into()))
}

/// POST /api/me/templates/{id}/share
#[utoipa::path(
    post,
    path = "/{id}/share",
    tag = TEMPLATE_TAG,
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template with share code", body = TemplateResponse),
        (status = 403, description = "Not the creator", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn share_template(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<TemplateResponse>> {
    let template = state.services.templates.share(&auth_user.user_id, &id).await?;
    Ok(Json(template.into()))
}

/// POST /api/admin/templates - Create an official template
#[utoipa::path(
    post,
    path = "/",
    tag = ADMIN_TAG,
    request_body = CreateTemplateRequest,
    responses((status = 201, description = "Official template created", body = TemplateResponse)),
    security(("bearerAuth" = []))
)]
async fn create_official_template(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTemplateRequest>,
) -> AppResult<(StatusCode, Json<TemplateResponse>)> {
    let template = state
        .services
        .templates
        .create_official(payload.into_draft()?)
        .await?;
    Ok((StatusCode::CREATED, Json(template.into())))
}

/// PUT /api/admin/templates/{id}/status - Review decision
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = ADMIN_TAG,
    params(("id" = String, Path, description = "Template ID")),
    request_body = TemplateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = TemplateResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn set_template_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<TemplateStatusRequest>,
) -> AppResult<Json<TemplateResponse>> {
    let template = state
        .services
        .templates
        .set_status(&id, payload.status)
        .await?;
    Ok(Json(template.into()))
}
