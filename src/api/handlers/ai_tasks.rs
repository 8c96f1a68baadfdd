//! AI generation task handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::AI_TASK_TAG;
use crate::api::dto::{
    AiTaskQuery, AiTaskResponse, CreateAiTaskRequest, ErrorResponse, PagedResponse,
    PaginationParams, UpdateAiTaskStatusRequest,
};
use crate::api::middleware::{AuthUser, MaybeAuthUser};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the authenticated AI task routes, mounted at `/api/ai-tasks`.
///
/// # Routes
/// - `POST /` - Submit a task
/// - `GET /` - List the caller's tasks
/// - `DELETE /{id}`
/// - `PUT /{id}/status` - Report progress
pub fn ai_task_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_task, list_tasks))
        .routes(routes!(delete_task))
        .routes(routes!(update_task_status))
}

/// Routes reachable without a token, mounted at `/api/ai-tasks`.
pub fn public_ai_task_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_public_tasks))
        .routes(routes!(get_task))
}

/// POST /api/ai-tasks - Submit a task
#[utoipa::path(
    post,
    path = "/",
    tag = AI_TASK_TAG,
    request_body = CreateAiTaskRequest,
    responses(
        (status = 201, description = "Task created in pending state", body = AiTaskResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateAiTaskRequest>,
) -> AppResult<(StatusCode, Json<AiTaskResponse>)> {
    let task = state
        .services
        .ai_tasks
        .create(
            &auth_user.user_id,
            payload.task_type,
            payload.input,
            payload.is_public,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// GET /api/ai-tasks - List the caller's tasks
#[utoipa::path(
    get,
    path = "/",
    tag = AI_TASK_TAG,
    params(PaginationParams, AiTaskQuery),
    responses((status = 200, description = "Caller's tasks, newest first", body = PagedResponse<AiTaskResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<AiTaskQuery>,
) -> AppResult<Json<PagedResponse<AiTaskResponse>>> {
    let (tasks, total) = state
        .services
        .ai_tasks
        .list(
            &auth_user.user_id,
            query.task_type,
            query.status,
            params.offset(),
            params.limit(),
        )
        .await?;
    Ok(Json(PagedResponse::from_rows(tasks, &params, total)))
}

/// GET /api/ai-tasks/public - Completed public tasks
#[utoipa::path(
    get,
    path = "/public",
    tag = AI_TASK_TAG,
    params(PaginationParams),
    responses((status = 200, description = "Public gallery", body = PagedResponse<AiTaskResponse>))
)]
async fn list_public_tasks(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<PagedResponse<AiTaskResponse>>> {
    let (tasks, total) = state
        .services
        .ai_tasks
        .list_public(params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(tasks, &params, total)))
}

/// GET /api/ai-tasks/{id} - Get a task
///
/// Anonymous callers and non-owners only see completed public tasks.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = AI_TASK_TAG,
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = AiTaskResponse),
        (status = 404, description = "Task not found or not visible", body = ErrorResponse)
    )
)]
async fn get_task(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AiTaskResponse>> {
    let task = state.services.ai_tasks.get(viewer.user_id(), id).await?;
    Ok(Json(task.into()))
}

/// DELETE /api/ai-tasks/{id}
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = AI_TASK_TAG,
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Task belongs to another user", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.ai_tasks.delete(&auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/ai-tasks/{id}/status - Move the task through its lifecycle
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = AI_TASK_TAG,
    params(("id" = Uuid, Path, description = "Task ID")),
    request_body = UpdateAiTaskStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = AiTaskResponse),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 403, description = "Task belongs to another user", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAiTaskStatusRequest>,
) -> AppResult<Json<AiTaskResponse>> {
    let task = state
        .services
        .ai_tasks
        .update_status(&auth_user.user_id, id, payload.into())
        .await?;
    Ok(Json(task.into()))
}
