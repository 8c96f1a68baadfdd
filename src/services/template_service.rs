use bigdecimal::{BigDecimal, Zero};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{
    NewTemplate, PriceType, Template, TemplateStatus, TemplateType, UpdateTemplate, Visibility,
};
use crate::repositories::{TemplateFilter, TemplateRepository};
use crate::utils::ids;
use crate::utils::time::now;

pub const DEFAULT_PRIMARY_COLOR: &str = "#000000";
const SHARE_CODE_ATTEMPTS: usize = 5;

/// Fields accepted when creating a template.
#[derive(Debug, Clone)]
pub struct TemplateDraft {
    pub name: String,
    pub description: Option<String>,
    pub template_type: TemplateType,
    pub visibility: Visibility,
    pub price_type: PriceType,
    pub price: Option<BigDecimal>,
    pub template_data: Option<JsonValue>,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub primary_color: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub sort_order: i32,
    pub base_template_id: Option<String>,
}

#[derive(Clone)]
pub struct TemplateService {
    repo: TemplateRepository,
}

impl TemplateService {
    pub fn new(repo: TemplateRepository) -> Self {
        Self { repo }
    }

    pub async fn list_public(
        &self,
        filter: TemplateFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Template>, i64)> {
        self.repo.list_public(&filter, offset, limit).await
    }

    async fn find(&self, id: &str) -> AppResult<Template> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|t| t.status != TemplateStatus::Deleted)
            .ok_or_else(|| AppError::not_found("templates", "template_id", id))
    }

    async fn find_owned(&self, user_id: &str, id: &str) -> AppResult<Template> {
        let template = self.find(id).await?;
        if !template.is_owned_by(user_id) {
            return Err(AppError::forbidden("Template belongs to another user"));
        }
        Ok(template)
    }

    /// Returns a template the viewer may see and counts the view.
    pub async fn get(&self, viewer: Option<&str>, id: &str) -> AppResult<Template> {
        let mut template = self.find(id).await?;
        let owned = viewer.is_some_and(|v| template.is_owned_by(v));
        if !owned && !template.is_publicly_listed() {
            return Err(AppError::not_found("templates", "template_id", id));
        }
        self.repo.increment_views(id).await?;
        template.view_count += 1;
        Ok(template)
    }

    pub async fn get_shared(&self, share_code: &str) -> AppResult<Template> {
        self.repo
            .find_by_share_code(share_code)
            .await?
            .filter(|t| t.visibility == Visibility::Shared || t.is_publicly_listed())
            .ok_or_else(|| AppError::not_found("templates", "share_code", share_code))
    }

    pub async fn list_mine(&self, user_id: &str, offset: i64, limit: i64) -> AppResult<(Vec<Template>, i64)> {
        self.repo.list_by_owner(user_id, offset, limit).await
    }

    async fn insert(&self, owner: Option<&str>, draft: TemplateDraft, status: TemplateStatus) -> AppResult<Template> {
        let template_data = match (draft.template_data, draft.base_template_id.as_deref()) {
            (Some(data), _) => data,
            (None, Some(base_id)) => {
                let base = self.find(base_id).await?;
                let readable = base.is_publicly_listed() || owner.is_some_and(|o| base.is_owned_by(o));
                if !readable {
                    return Err(AppError::not_found("templates", "template_id", base_id));
                }
                base.template_data
            }
            (None, None) => serde_json::json!({}),
        };

        let published_at = (status == TemplateStatus::Published).then(now);
        let template = self
            .repo
            .create(NewTemplate {
                template_id: ids::template_id(),
                owner_id: owner.map(str::to_string),
                name: draft.name,
                description: draft.description,
                template_type: draft.template_type,
                status,
                visibility: draft.visibility,
                price_type: draft.price_type,
                price: draft.price.unwrap_or_else(BigDecimal::zero),
                template_data,
                preview_url: draft.preview_url,
                thumbnail_url: draft.thumbnail_url,
                primary_color: draft
                    .primary_color
                    .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
                tags: serde_json::json!(draft.tags),
                category: draft.category,
                sort_order: draft.sort_order,
                published_at,
            })
            .await?;

        info!(template_id = %template.template_id, owner = ?template.owner_id, "Template created");
        Ok(template)
    }

    /// Creates a draft owned by the caller.
    pub async fn create(&self, user_id: &str, draft: TemplateDraft) -> AppResult<Template> {
        self.insert(Some(user_id), draft, TemplateStatus::Draft).await
    }

    /// Creates an official template, published immediately.
    pub async fn create_official(&self, draft: TemplateDraft) -> AppResult<Template> {
        self.insert(None, draft, TemplateStatus::Published).await
    }

    pub async fn update(&self, user_id: &str, id: &str, mut changes: UpdateTemplate) -> AppResult<Template> {
        self.find_owned(user_id, id).await?;
        // status, sharing and publication have their own operations
        changes.status = None;
        changes.share_code = None;
        changes.published_at = None;
        self.repo.update(id, changes).await
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> AppResult<()> {
        self.find_owned(user_id, id).await?;
        self.repo
            .update(
                id,
                UpdateTemplate {
                    status: Some(TemplateStatus::Deleted),
                    ..Default::default()
                },
            )
            .await?;
        info!(template_id = id, "Template deleted");
        Ok(())
    }

    pub async fn publish(&self, user_id: &str, id: &str) -> AppResult<Template> {
        self.find_owned(user_id, id).await?;
        self.repo
            .update(
                id,
                UpdateTemplate {
                    status: Some(TemplateStatus::Published),
                    published_at: Some(now()),
                    ..Default::default()
                },
            )
            .await
    }

    /// Marks the template shared, generating a share code on first share.
    pub async fn share(&self, user_id: &str, id: &str) -> AppResult<Template> {
        let template = self.find_owned(user_id, id).await?;
        let share_code = match template.share_code {
            Some(code) => code,
            None => self.unique_share_code().await?,
        };
        let template = self
            .repo
            .update(
                id,
                UpdateTemplate {
                    visibility: Some(Visibility::Shared),
                    share_code: Some(share_code),
                    ..Default::default()
                },
            )
            .await?;
        info!(template_id = id, share_code = ?template.share_code, "Template shared");
        Ok(template)
    }

    async fn unique_share_code(&self) -> AppResult<String> {
        for _ in 0..SHARE_CODE_ATTEMPTS {
            let code = ids::share_code();
            if !self.repo.share_code_taken(&code).await? {
                return Ok(code);
            }
        }
        Err(AppError::Internal {
            source: anyhow::anyhow!("could not generate a unique share code"),
        })
    }

    pub async fn record_use(&self, id: &str) -> AppResult<i32> {
        self.repo
            .increment_uses(id)
            .await?
            .ok_or_else(|| AppError::not_found("templates", "template_id", id))
    }

    pub async fn set_status(&self, id: &str, status: TemplateStatus) -> AppResult<Template> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("templates", "template_id", id))?;
        let published_at = (status == TemplateStatus::Published && current.published_at.is_none()).then(now);
        let template = self
            .repo
            .update(
                id,
                UpdateTemplate {
                    status: Some(status),
                    published_at,
                    ..Default::default()
                },
            )
            .await?;
        info!(template_id = id, status = ?status, "Template status set by admin");
        Ok(template)
    }
}
