use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{AiTask, AiTaskStatus, AiTaskType, NewAiTask, UpdateAiTask};

#[derive(Clone)]
pub struct AiTaskRepository {
    pool: AsyncDbPool,
}

impl AiTaskRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, task: NewAiTask) -> AppResult<AiTask> {
        use crate::schema::ai_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(ai_tasks)
            .values(&task)
            .returning(AiTask::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, task_id: Uuid) -> AppResult<Option<AiTask>> {
        use crate::schema::ai_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        ai_tasks
            .find(task_id)
            .select(AiTask::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn list_by_user(
        &self,
        uid: &str,
        kind: Option<AiTaskType>,
        state: Option<AiTaskStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<AiTask>, i64)> {
        use crate::schema::ai_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        let mut query = ai_tasks.filter(user_id.eq(uid)).into_boxed();
        let mut count_query = ai_tasks.filter(user_id.eq(uid)).into_boxed();
        if let Some(kind) = kind {
            query = query.filter(task_type.eq(kind));
            count_query = count_query.filter(task_type.eq(kind));
        }
        if let Some(state) = state {
            query = query.filter(status.eq(state));
            count_query = count_query.filter(status.eq(state));
        }

        let list = query
            .order(created_at.desc())
            .offset(offset)
            .limit(limit)
            .select(AiTask::as_select())
            .load(&mut conn)
            .await?;
        let total = count_query.count().get_result::<i64>(&mut conn).await?;

        Ok((list, total))
    }

    /// Completed tasks their owners marked public, newest first.
    pub async fn list_public(&self, offset: i64, limit: i64) -> AppResult<(Vec<AiTask>, i64)> {
        use crate::schema::ai_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        let list = ai_tasks
            .filter(is_public.eq(true))
            .filter(status.eq(AiTaskStatus::Completed))
            .order(created_at.desc())
            .offset(offset)
            .limit(limit)
            .select(AiTask::as_select())
            .load(&mut conn)
            .await?;
        let total = ai_tasks
            .filter(is_public.eq(true))
            .filter(status.eq(AiTaskStatus::Completed))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok((list, total))
    }

    /// Applies `changes` only if the row is still in `expected` status, so
    /// two workers cannot both move the same task.
    pub async fn transition(
        &self,
        task_id: Uuid,
        expected: AiTaskStatus,
        mut changes: UpdateAiTask,
    ) -> AppResult<Option<AiTask>> {
        use crate::schema::ai_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        changes.updated_at = Some(crate::utils::time::now());
        diesel::update(ai_tasks.find(task_id).filter(status.eq(expected)))
            .set(&changes)
            .returning(AiTask::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn delete(&self, task_id: Uuid) -> AppResult<usize> {
        use crate::schema::ai_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(ai_tasks.find(task_id))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Fails tasks stuck in pending or running since before `cutoff`.
    pub async fn fail_stale(&self, cutoff: NaiveDateTime, reason: &str) -> AppResult<usize> {
        use crate::schema::ai_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        let now = crate::utils::time::now();
        diesel::update(
            ai_tasks
                .filter(status.eq_any([AiTaskStatus::Pending, AiTaskStatus::Running]))
                .filter(updated_at.lt(cutoff)),
        )
        .set((
            status.eq(AiTaskStatus::Failed),
            error_log.eq(Some(serde_json::json!({ "message": reason }))),
            completed_at.eq(Some(now)),
            updated_at.eq(now),
        ))
        .execute(&mut conn)
        .await
        .map_err(AppError::from)
    }
}
