//! Invitation and commission handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::{ADMIN_TAG, INVITATION_TAG};
use crate::api::dto::{
    BindInvitationRequest, CommissionRecordResponse, CommissionStatusRequest,
    CommissionSummaryResponse, ErrorResponse, InvitationCodeResponse, InvitationInfoResponse,
    InvitationRelationResponse, InviteeResponse, PagedResponse, PaginationParams,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the invitation routes, mounted at `/api/invitations`.
///
/// # Routes
/// - `GET /code` - The caller's code, created on first call
/// - `POST /bind` - Attach the caller to an inviter
/// - `GET /info`
/// - `GET /` - The caller's invitees
pub fn invitation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_code))
        .routes(routes!(bind))
        .routes(routes!(get_info))
        .routes(routes!(list_invitees))
}

/// Creates the commission routes, mounted at `/api/commissions`.
pub fn commission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_commissions))
        .routes(routes!(commission_summary))
}

/// Admin routes, mounted at `/api/admin/commissions`.
pub fn admin_commission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(update_commission_status))
}

/// GET /api/invitations/code
#[utoipa::path(
    get,
    path = "/code",
    tag = INVITATION_TAG,
    responses((status = 200, description = "Caller's invitation code", body = InvitationCodeResponse)),
    security(("bearerAuth" = []))
)]
async fn get_code(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<InvitationCodeResponse>> {
    let code = state
        .services
        .invitations
        .get_or_create_code(&auth_user.user_id)
        .await?;
    Ok(Json(code.into()))
}

/// POST /api/invitations/bind
#[utoipa::path(
    post,
    path = "/bind",
    tag = INVITATION_TAG,
    request_body = BindInvitationRequest,
    responses(
        (status = 201, description = "Relation created and rewards granted", body = InvitationRelationResponse),
        (status = 400, description = "Own code used", body = ErrorResponse),
        (status = 404, description = "Unknown code", body = ErrorResponse),
        (status = 409, description = "Caller already has an inviter", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn bind(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<BindInvitationRequest>,
) -> AppResult<(StatusCode, Json<InvitationRelationResponse>)> {
    let relation = state
        .services
        .invitations
        .bind(&auth_user.user_id, &payload.code)
        .await?;
    Ok((StatusCode::CREATED, Json(relation.into())))
}

/// GET /api/invitations/info
#[utoipa::path(
    get,
    path = "/info",
    tag = INVITATION_TAG,
    responses((status = 200, description = "Code, invitee count and inviter", body = InvitationInfoResponse)),
    security(("bearerAuth" = []))
)]
async fn get_info(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<InvitationInfoResponse>> {
    let info = state.services.invitations.info(&auth_user.user_id).await?;
    Ok(Json(info.into()))
}

/// GET /api/invitations - Newest invitees first
#[utoipa::path(
    get,
    path = "/",
    tag = INVITATION_TAG,
    params(PaginationParams),
    responses((status = 200, description = "Invited users", body = PagedResponse<InviteeResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_invitees(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<PagedResponse<InviteeResponse>>> {
    let (invitees, total) = state
        .services
        .invitations
        .invitees(&auth_user.user_id, params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(invitees, &params, total)))
}

/// GET /api/commissions
#[utoipa::path(
    get,
    path = "/",
    tag = INVITATION_TAG,
    params(PaginationParams),
    responses((status = 200, description = "Caller's commission records", body = PagedResponse<CommissionRecordResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_commissions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<PagedResponse<CommissionRecordResponse>>> {
    let (records, total) = state
        .services
        .commissions
        .records(&auth_user.user_id, params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(records, &params, total)))
}

/// GET /api/commissions/summary
#[utoipa::path(
    get,
    path = "/summary",
    tag = INVITATION_TAG,
    responses((status = 200, description = "Totals per status", body = CommissionSummaryResponse)),
    security(("bearerAuth" = []))
)]
async fn commission_summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<CommissionSummaryResponse>> {
    let summary = state.services.commissions.summary(&auth_user.user_id).await?;
    Ok(Json(summary.into()))
}

/// PUT /api/admin/commissions/{id}/status
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = ADMIN_TAG,
    params(("id" = i64, Path, description = "Commission record ID")),
    request_body = CommissionStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = CommissionRecordResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_commission_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CommissionStatusRequest>,
) -> AppResult<Json<CommissionRecordResponse>> {
    let record = state
        .services
        .commissions
        .update_status(id, payload.status)
        .await?;
    Ok(Json(record.into()))
}
