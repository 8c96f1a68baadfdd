use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::Value as JsonValue;

use crate::models::{PriceType, TemplateStatus, TemplateType, Visibility};

/// A layout template. `owner_id` is `None` for official templates.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Template {
    pub template_id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub template_type: TemplateType,
    pub status: TemplateStatus,
    pub visibility: Visibility,
    pub price_type: PriceType,
    pub price: BigDecimal,
    pub template_data: JsonValue,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub primary_color: String,
    pub tags: JsonValue,
    pub category: Option<String>,
    pub share_code: Option<String>,
    pub use_count: i32,
    pub like_count: i32,
    pub view_count: i32,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub published_at: Option<NaiveDateTime>,
}

impl Template {
    pub fn is_official(&self) -> bool {
        self.owner_id.is_none()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }

    /// Published and either public or official.
    pub fn is_publicly_listed(&self) -> bool {
        self.status == TemplateStatus::Published
            && (self.visibility == Visibility::Public || self.is_official())
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::templates)]
pub struct NewTemplate {
    pub template_id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub template_type: TemplateType,
    pub status: TemplateStatus,
    pub visibility: Visibility,
    pub price_type: PriceType,
    pub price: BigDecimal,
    pub template_data: JsonValue,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub primary_color: String,
    pub tags: JsonValue,
    pub category: Option<String>,
    pub sort_order: i32,
    pub published_at: Option<NaiveDateTime>,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::templates)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub template_type: Option<TemplateType>,
    pub status: Option<TemplateStatus>,
    pub visibility: Option<Visibility>,
    pub template_data: Option<JsonValue>,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub primary_color: Option<String>,
    pub tags: Option<JsonValue>,
    pub category: Option<String>,
    pub share_code: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(owner: Option<&str>, status: TemplateStatus, visibility: Visibility) -> Template {
        let now = chrono::Utc::now().naive_utc();
        Template {
            template_id: "tpl_000000000001".to_string(),
            owner_id: owner.map(str::to_string),
            name: "Clean".to_string(),
            description: None,
            template_type: TemplateType::Wechat,
            status,
            visibility,
            price_type: PriceType::Free,
            price: BigDecimal::from(0),
            template_data: serde_json::json!({}),
            preview_url: None,
            thumbnail_url: None,
            primary_color: "#000000".to_string(),
            tags: serde_json::json!([]),
            category: None,
            share_code: None,
            use_count: 0,
            like_count: 0,
            view_count: 0,
            sort_order: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    #[test]
    fn test_official_published_is_listed_even_if_private() {
        let t = template(None, TemplateStatus::Published, Visibility::Private);
        assert!(t.is_publicly_listed());
    }

    #[test]
    fn test_user_template_needs_public_visibility() {
        let private = template(Some("u_1"), TemplateStatus::Published, Visibility::Private);
        let public = template(Some("u_1"), TemplateStatus::Published, Visibility::Public);
        let draft = template(Some("u_1"), TemplateStatus::Draft, Visibility::Public);
        assert!(!private.is_publicly_listed());
        assert!(public.is_publicly_listed());
        assert!(!draft.is_publicly_listed());
    }

    #[test]
    fn test_ownership() {
        let t = template(Some("u_1"), TemplateStatus::Draft, Visibility::Private);
        assert!(t.is_owned_by("u_1"));
        assert!(!t.is_owned_by("u_2"));
        assert!(!template(None, TemplateStatus::Draft, Visibility::Private).is_owned_by("u_1"));
    }
}
