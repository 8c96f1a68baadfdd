use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewTemplate, Template, TemplateStatus, UpdateTemplate, Visibility};
use crate::repositories::contains_pattern;

/// Filters for the public template gallery.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub category: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Clone)]
pub struct TemplateRepository {
    pool: AsyncDbPool,
}

impl TemplateRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, template: NewTemplate) -> AppResult<Template> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(templates)
            .values(&template)
            .returning(Template::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Template>> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        templates
            .find(id)
            .select(Template::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_by_share_code(&self, code: &str) -> AppResult<Option<Template>> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        templates
            .filter(share_code.eq(code))
            .filter(status.ne(TemplateStatus::Deleted))
            .select(Template::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Published templates that are public or official, ordered by
    /// `sort_order` then popularity.
    pub async fn list_public(
        &self,
        filter: &TemplateFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Template>, i64)> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        let build = || {
            let mut query = templates
                .filter(status.eq(TemplateStatus::Published))
                .filter(visibility.eq(Visibility::Public).or(owner_id.is_null()))
                .into_boxed();
            if let Some(cat) = &filter.category {
                query = query.filter(category.eq(cat.clone()));
            }
            if let Some(kw) = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
                let pattern = contains_pattern(kw);
                query = query.filter(
                    name.ilike(pattern.clone())
                        .or(description.assume_not_null().ilike(pattern)),
                );
            }
            query
        };

        let list = build()
            .order((sort_order.desc(), use_count.desc(), created_at.desc()))
            .offset(offset)
            .limit(limit)
            .select(Template::as_select())
            .load(&mut conn)
            .await?;
        let total = build().count().get_result::<i64>(&mut conn).await?;

        Ok((list, total))
    }

    /// A user's own templates, excluding soft-deleted ones.
    pub async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Template>, i64)> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        let list = templates
            .filter(owner_id.eq(owner))
            .filter(status.ne(TemplateStatus::Deleted))
            .order(updated_at.desc())
            .offset(offset)
            .limit(limit)
            .select(Template::as_select())
            .load(&mut conn)
            .await?;
        let total = templates
            .filter(owner_id.eq(owner))
            .filter(status.ne(TemplateStatus::Deleted))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok((list, total))
    }

    pub async fn update(&self, id: &str, mut changes: UpdateTemplate) -> AppResult<Template> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        changes.updated_at = Some(crate::utils::time::now());
        diesel::update(templates.find(id))
            .set(&changes)
            .returning(Template::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(templates.find(id))
            .set(view_count.eq(view_count + 1))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn increment_uses(&self, id: &str) -> AppResult<Option<i32>> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(templates.find(id).filter(status.eq(TemplateStatus::Published)))
            .set(use_count.eq(use_count + 1))
            .returning(use_count)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn share_code_taken(&self, code: &str) -> AppResult<bool> {
        use crate::schema::templates::dsl::*;
        let mut conn = self.pool.get().await?;

        let count: i64 = templates
            .filter(share_code.eq(code))
            .count()
            .get_result(&mut conn)
            .await?;
        Ok(count > 0)
    }
}
