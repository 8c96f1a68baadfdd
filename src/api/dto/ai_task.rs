//! AI generation task DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AiTask, AiTaskStatus, AiTaskType};
use crate::services::StatusReport;
use crate::utils::time::{format_optional, format_timestamp};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAiTaskRequest {
    pub task_type: AiTaskType,
    #[validate(length(min = 1, max = 50000, message = "Input must be between 1 and 50000 characters"))]
    pub input: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct AiTaskQuery {
    pub task_type: Option<AiTaskType>,
    pub status: Option<AiTaskStatus>,
}

/// Progress reported by the worker processing the task.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateAiTaskStatusRequest {
    pub status: AiTaskStatus,
    pub output: Option<String>,
    #[validate(range(min = 0, message = "tokens must not be negative"))]
    pub tokens: Option<i32>,
    #[validate(length(max = 50, message = "model_version must be at most 50 characters"))]
    pub model_version: Option<String>,
    /// Stored as `{"message": error}` when the task fails
    pub error: Option<String>,
}

impl From<UpdateAiTaskStatusRequest> for StatusReport {
    fn from(req: UpdateAiTaskStatusRequest) -> Self {
        StatusReport {
            status: req.status,
            output: req.output,
            tokens: req.tokens,
            model_version: req.model_version,
            error: req.error,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AiTaskResponse {
    pub id: Uuid,
    pub user_id: String,
    pub task_type: AiTaskType,
    pub input: String,
    pub output: Option<String>,
    pub status: AiTaskStatus,
    pub tokens: Option<i32>,
    pub model_version: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub error_log: Option<JsonValue>,
    pub credits_cost: i32,
    pub is_public: bool,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AiTask> for AiTaskResponse {
    fn from(task: AiTask) -> Self {
        Self {
            started_at: format_optional(task.started_at),
            completed_at: format_optional(task.completed_at),
            created_at: format_timestamp(task.created_at),
            updated_at: format_timestamp(task.updated_at),
            id: task.id,
            user_id: task.user_id,
            task_type: task.task_type,
            input: task.input,
            output: task.output,
            status: task.status,
            tokens: task.tokens,
            model_version: task.model_version,
            error_log: task.error_log,
            credits_cost: task.credits_cost,
            is_public: task.is_public,
        }
    }
}
