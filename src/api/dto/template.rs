//! Template gallery DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{PriceType, Template, TemplateStatus, TemplateType, UpdateTemplate, Visibility};
use crate::repositories::TemplateFilter;
use crate::services::TemplateDraft;
use crate::utils::money::{from_f64, to_f64};
use crate::utils::time::{format_optional, format_timestamp};

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct TemplateQuery {
    pub category: Option<String>,
    /// Matches name or description
    pub keyword: Option<String>,
}

impl From<TemplateQuery> for TemplateFilter {
    fn from(query: TemplateQuery) -> Self {
        TemplateFilter {
            category: query.category.filter(|c| !c.trim().is_empty()),
            keyword: query.keyword.filter(|k| !k.trim().is_empty()),
        }
    }
}

fn default_template_type() -> TemplateType {
    TemplateType::Wechat
}

fn default_visibility() -> Visibility {
    Visibility::Private
}

fn default_price_type() -> PriceType {
    PriceType::Free
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_template_type")]
    pub template_type: TemplateType,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
    #[serde(default = "default_price_type")]
    pub price_type: PriceType,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub template_data: Option<JsonValue>,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[validate(length(min = 4, max = 20, message = "primary_color must be a color value"))]
    #[schema(example = "#000000")]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    /// Template whose data is copied when `template_data` is omitted
    pub base_template_id: Option<String>,
}

impl CreateTemplateRequest {
    pub fn into_draft(self) -> AppResult<TemplateDraft> {
        let price = match self.price {
            Some(value) => Some(from_f64(value).ok_or_else(|| AppError::Validation {
                field: "price".to_string(),
                reason: "must be a finite number".to_string(),
            })?),
            None => None,
        };
        Ok(TemplateDraft {
            name: self.name,
            description: self.description,
            template_type: self.template_type,
            visibility: self.visibility,
            price_type: self.price_type,
            price,
            template_data: self.template_data,
            preview_url: self.preview_url,
            thumbnail_url: self.thumbnail_url,
            primary_color: self.primary_color,
            tags: self.tags,
            category: self.category,
            sort_order: self.sort_order,
            base_template_id: self.base_template_id,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub template_type: Option<TemplateType>,
    pub visibility: Option<Visibility>,
    #[schema(value_type = Option<Object>)]
    pub template_data: Option<JsonValue>,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[validate(length(min = 4, max = 20, message = "primary_color must be a color value"))]
    pub primary_color: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
}

impl From<UpdateTemplateRequest> for UpdateTemplate {
    fn from(req: UpdateTemplateRequest) -> Self {
        UpdateTemplate {
            name: req.name,
            description: req.description,
            template_type: req.template_type,
            visibility: req.visibility,
            template_data: req.template_data,
            preview_url: req.preview_url,
            thumbnail_url: req.thumbnail_url,
            primary_color: req.primary_color,
            tags: req.tags.map(|t| serde_json::json!(t)),
            category: req.category,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TemplateStatusRequest {
    pub status: TemplateStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UseCountResponse {
    pub use_count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateResponse {
    #[schema(example = "tpl_0a1b2c3d4e5f")]
    pub template_id: String,
    /// `null` for official templates
    pub owner_id: Option<String>,
    pub is_official: bool,
    pub name: String,
    pub description: Option<String>,
    pub template_type: TemplateType,
    pub status: TemplateStatus,
    pub visibility: Visibility,
    pub price_type: PriceType,
    pub price: f64,
    #[schema(value_type = Object)]
    pub template_data: JsonValue,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub primary_color: String,
    #[schema(value_type = Vec<String>)]
    pub tags: JsonValue,
    pub category: Option<String>,
    pub share_code: Option<String>,
    pub use_count: i32,
    pub like_count: i32,
    pub view_count: i32,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

impl From<Template> for TemplateResponse {
    fn from(t: Template) -> Self {
        Self {
            is_official: t.is_official(),
            price: to_f64(&t.price),
            created_at: format_timestamp(t.created_at),
            updated_at: format_timestamp(t.updated_at),
            published_at: format_optional(t.published_at),
            template_id: t.template_id,
            owner_id: t.owner_id,
            name: t.name,
            description: t.description,
            template_type: t.template_type,
            status: t.status,
            visibility: t.visibility,
            price_type: t.price_type,
            template_data: t.template_data,
            preview_url: t.preview_url,
            thumbnail_url: t.thumbnail_url,
            primary_color: t.primary_color,
            tags: t.tags,
            category: t.category,
            share_code: t.share_code,
            use_count: t.use_count,
            like_count: t.like_count,
            view_count: t.view_count,
            sort_order: t.sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTemplateRequest = serde_json::from_str(r#"{"name": "Clean"}"#).unwrap();
        assert_eq!(req.template_type, TemplateType::Wechat);
        assert_eq!(req.visibility, Visibility::Private);
        let draft = req.into_draft().unwrap();
        assert!(draft.price.is_none());
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_update_request_never_touches_status() {
        let req: UpdateTemplateRequest =
            serde_json::from_str(r#"{"name": "Renamed", "tags": ["a", "b"]}"#).unwrap();
        let changes = UpdateTemplate::from(req);
        assert!(changes.status.is_none());
        assert_eq!(changes.tags, Some(serde_json::json!(["a", "b"])));
    }

    #[test]
    fn test_blank_filters_are_dropped() {
        let filter = TemplateFilter::from(TemplateQuery {
            category: Some("  ".to_string()),
            keyword: Some("minimal".to_string()),
        });
        assert!(filter.category.is_none());
        assert_eq!(filter.keyword.as_deref(), Some("minimal"));
    }
}
