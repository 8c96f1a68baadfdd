use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AiTask, AiTaskStatus, AiTaskType, NewAiTask, UpdateAiTask};
use crate::repositories::AiTaskRepository;
use crate::utils::time::now;

/// Progress reported by a worker.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub status: AiTaskStatus,
    pub output: Option<String>,
    pub tokens: Option<i32>,
    pub model_version: Option<String>,
    pub error: Option<String>,
}

/// Changes for moving from `current` into `report.status`, stamped at `at`.
pub fn transition_changes(
    current: AiTaskStatus,
    report: StatusReport,
    at: NaiveDateTime,
) -> AppResult<UpdateAiTask> {
    if !current.can_transition_to(report.status) {
        return Err(AppError::bad_request(format!(
            "Cannot move task from {:?} to {:?}",
            current, report.status
        )));
    }

    let mut changes = UpdateAiTask {
        status: Some(report.status),
        output: report.output,
        tokens: report.tokens,
        model_version: report.model_version,
        ..Default::default()
    };
    match report.status {
        AiTaskStatus::Running => changes.started_at = Some(at),
        AiTaskStatus::Completed => changes.completed_at = Some(at),
        AiTaskStatus::Failed => {
            changes.completed_at = Some(at);
            let message = report.error.unwrap_or_else(|| "unknown error".to_string());
            changes.error_log = Some(serde_json::json!({ "message": message }));
        }
        AiTaskStatus::Pending => {}
    }
    Ok(changes)
}

#[derive(Clone)]
pub struct AiTaskService {
    repo: AiTaskRepository,
}

impl AiTaskService {
    pub fn new(repo: AiTaskRepository) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        user_id: &str,
        task_type: AiTaskType,
        input: String,
        is_public: bool,
    ) -> AppResult<AiTask> {
        let task = self
            .repo
            .create(NewAiTask {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                task_type,
                input,
                status: AiTaskStatus::Pending,
                credits_cost: 0,
                is_public,
            })
            .await?;
        info!(task_id = %task.id, user_id, task_type = ?task_type, "AI task created");
        Ok(task)
    }

    pub async fn list(
        &self,
        user_id: &str,
        task_type: Option<AiTaskType>,
        status: Option<AiTaskStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<AiTask>, i64)> {
        self.repo
            .list_by_user(user_id, task_type, status, offset, limit)
            .await
    }

    pub async fn list_public(&self, offset: i64, limit: i64) -> AppResult<(Vec<AiTask>, i64)> {
        self.repo.list_public(offset, limit).await
    }

    async fn find(&self, id: Uuid) -> AppResult<AiTask> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("ai_tasks", "id", id))
    }

    /// Owners see their own tasks; others only completed public ones.
    pub async fn get(&self, viewer: Option<&str>, id: Uuid) -> AppResult<AiTask> {
        let task = self.find(id).await?;
        let owned = viewer.is_some_and(|v| v == task.user_id);
        if owned || (task.is_public && task.status == AiTaskStatus::Completed) {
            Ok(task)
        } else {
            Err(AppError::not_found("ai_tasks", "id", id))
        }
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        let task = self.find(id).await?;
        if task.user_id != user_id {
            return Err(AppError::forbidden("Task belongs to another user"));
        }
        self.repo.delete(id).await?;
        info!(task_id = %id, "AI task deleted");
        Ok(())
    }

    pub async fn update_status(&self, user_id: &str, id: Uuid, report: StatusReport) -> AppResult<AiTask> {
        let task = self.find(id).await?;
        if task.user_id != user_id {
            return Err(AppError::forbidden("Task belongs to another user"));
        }

        let next = report.status;
        let changes = transition_changes(task.status, report, now())?;
        let updated = self
            .repo
            .transition(id, task.status, changes)
            .await?
            .ok_or_else(|| AppError::bad_request("Task status changed concurrently, retry"))?;

        info!(task_id = %id, from = ?task.status, to = ?next, "AI task status updated");
        Ok(updated)
    }

    pub async fn fail_stale(&self, cutoff: NaiveDateTime) -> AppResult<usize> {
        self.repo.fail_stale(cutoff, "task timed out").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap()
    }

    fn report(status: AiTaskStatus) -> StatusReport {
        StatusReport {
            status,
            output: None,
            tokens: None,
            model_version: None,
            error: None,
        }
    }

    #[test]
    fn test_running_stamps_started_at() {
        let changes = transition_changes(AiTaskStatus::Pending, report(AiTaskStatus::Running), at()).unwrap();
        assert_eq!(changes.started_at, Some(at()));
        assert!(changes.completed_at.is_none());
    }

    #[test]
    fn test_failed_records_error_message() {
        let mut r = report(AiTaskStatus::Failed);
        r.error = Some("model overloaded".into());
        let changes = transition_changes(AiTaskStatus::Running, r, at()).unwrap();
        assert_eq!(changes.completed_at, Some(at()));
        assert_eq!(
            changes.error_log,
            Some(serde_json::json!({ "message": "model overloaded" }))
        );
    }

    #[test]
    fn test_terminal_state_rejects_changes() {
        let err = transition_changes(AiTaskStatus::Completed, report(AiTaskStatus::Failed), at());
        assert!(matches!(err, Err(AppError::BadRequest { .. })));
    }
}
