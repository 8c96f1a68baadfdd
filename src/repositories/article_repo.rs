use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ArticleEditTask, NewArticleEditTask, UpdateArticleEditTask};

#[derive(Clone)]
pub struct ArticleRepository {
    pool: AsyncDbPool,
}

impl ArticleRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, article: NewArticleEditTask) -> AppResult<ArticleEditTask> {
        use crate::schema::article_edit_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(article_edit_tasks)
            .values(&article)
            .returning(ArticleEditTask::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, article_id: Uuid) -> AppResult<Option<ArticleEditTask>> {
        use crate::schema::article_edit_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        article_edit_tasks
            .find(article_id)
            .select(ArticleEditTask::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn list_by_user(
        &self,
        uid: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ArticleEditTask>, i64)> {
        use crate::schema::article_edit_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        let list = article_edit_tasks
            .filter(user_id.eq(uid))
            .order(updated_at.desc())
            .offset(offset)
            .limit(limit)
            .select(ArticleEditTask::as_select())
            .load(&mut conn)
            .await?;
        let total = article_edit_tasks
            .filter(user_id.eq(uid))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok((list, total))
    }

    /// Returns `None` when the article no longer exists.
    pub async fn update(
        &self,
        article_id: Uuid,
        mut changes: UpdateArticleEditTask,
    ) -> AppResult<Option<ArticleEditTask>> {
        use crate::schema::article_edit_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        changes.updated_at = Some(crate::utils::time::now());
        diesel::update(article_edit_tasks.find(article_id))
            .set(&changes)
            .returning(ArticleEditTask::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn delete(&self, article_id: Uuid) -> AppResult<usize> {
        use crate::schema::article_edit_tasks::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(article_edit_tasks.find(article_id))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
