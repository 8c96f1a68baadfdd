use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ArticleStatus")]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Editing,
    Pending,
    Draft,
    Published,
}

impl ArticleStatus {
    /// Human readable publish progress.
    pub fn message(self) -> &'static str {
        match self {
            ArticleStatus::Editing => "Editing",
            ArticleStatus::Pending => "Publishing",
            ArticleStatus::Draft => "Saved to drafts",
            ArticleStatus::Published => "Published",
        }
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::article_edit_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleEditTask {
    pub id: Uuid,
    pub user_id: String,
    pub ai_task_id: Option<Uuid>,
    pub title: String,
    pub theme: String,
    pub content: String,
    pub section_html: Option<String>,
    pub status: ArticleStatus,
    pub is_public: bool,
    pub tags: JsonValue,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::article_edit_tasks)]
pub struct NewArticleEditTask {
    pub id: Uuid,
    pub user_id: String,
    pub ai_task_id: Option<Uuid>,
    pub title: String,
    pub theme: String,
    pub content: String,
    pub section_html: Option<String>,
    pub status: ArticleStatus,
    pub is_public: bool,
    pub tags: JsonValue,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::article_edit_tasks)]
pub struct UpdateArticleEditTask {
    pub title: Option<String>,
    pub theme: Option<String>,
    pub content: Option<String>,
    pub section_html: Option<String>,
    pub status: Option<ArticleStatus>,
    pub is_public: Option<bool>,
    pub tags: Option<JsonValue>,
    pub published_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::ArticleStatus;

    #[test]
    fn test_status_messages() {
        assert_eq!(ArticleStatus::Editing.message(), "Editing");
        assert_eq!(ArticleStatus::Pending.message(), "Publishing");
        assert_eq!(ArticleStatus::Draft.message(), "Saved to drafts");
        assert_eq!(ArticleStatus::Published.message(), "Published");
    }
}
