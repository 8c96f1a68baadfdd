//! Admin user management handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::ADMIN_TAG;
use crate::api::dto::{
    AdminUpdateUserRequest, AdminUserQuery, ErrorResponse, PagedResponse, PaginationParams,
    UserResponse,
};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the admin user routes, mounted at `/api/admin/users`.
///
/// # Routes
/// - `GET /` - Search users
/// - `GET /{id}` - Get one user
/// - `PUT /{id}` - Change role, VIP level or active flag
pub fn admin_user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(get_user, update_user))
}

/// GET /api/admin/users - List users
#[utoipa::path(
    get,
    path = "/",
    tag = ADMIN_TAG,
    params(PaginationParams, AdminUserQuery),
    responses(
        (status = 200, description = "Paginated list of users", body = PagedResponse<UserResponse>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_users(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<AdminUserQuery>,
) -> AppResult<Json<PagedResponse<UserResponse>>> {
    let (users, total) = state
        .services
        .users
        .list_users(query.keyword.as_deref(), params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(users, &params, total)))
}

/// GET /api/admin/users/{id} - Get user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = ADMIN_TAG,
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_user(&id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/admin/users/{id} - Update role, VIP level or active flag
#[utoipa::path(
    put,
    path = "/{id}",
    tag = ADMIN_TAG,
    params(("id" = String, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<AdminUpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users
        .admin_update(&id, payload.into())
        .await?;
    Ok(Json(UserResponse::from(user)))
}
