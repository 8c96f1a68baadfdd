//! Article editing and publish DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{ArticleEditTask, ArticleStatus};
use crate::services::{ArticleChanges, ArticleDraft, PublishRequest, PublishStatus};
use crate::utils::time::{format_optional, format_timestamp};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
    #[validate(length(min = 1, max = 50, message = "Theme must be between 1 and 50 characters"))]
    #[schema(example = "default")]
    pub theme: Option<String>,
    /// Generation task the article was produced from
    pub ai_task_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl From<CreateArticleRequest> for ArticleDraft {
    fn from(req: CreateArticleRequest) -> Self {
        ArticleDraft {
            title: req.title,
            content: req.content,
            theme: req.theme,
            ai_task_id: req.ai_task_id,
            tags: req.tags,
            is_public: req.is_public,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Theme must be between 1 and 50 characters"))]
    pub theme: Option<String>,
    pub status: Option<ArticleStatus>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

impl From<UpdateArticleRequest> for ArticleChanges {
    fn from(req: UpdateArticleRequest) -> Self {
        ArticleChanges {
            title: req.title,
            content: req.content,
            theme: req.theme,
            status: req.status,
            tags: req.tags,
            is_public: req.is_public,
        }
    }
}

/// Overrides applied before publishing.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct PublishArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    #[validate(length(max = 500, message = "Digest must be at most 500 characters"))]
    pub digest: Option<String>,
    /// Publish online when true, otherwise save to drafts
    #[serde(default)]
    pub sync_online: bool,
}

impl From<PublishArticleRequest> for PublishRequest {
    fn from(req: PublishArticleRequest) -> Self {
        PublishRequest {
            title: req.title,
            content: req.content,
            digest: req.digest,
            sync_online: req.sync_online,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublishAcceptedResponse {
    pub task_id: Uuid,
    pub status: ArticleStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublishStatusResponse {
    pub status: ArticleStatus,
    #[schema(example = "Publishing")]
    pub message: String,
    pub published_at: Option<String>,
}

impl From<PublishStatus> for PublishStatusResponse {
    fn from(status: PublishStatus) -> Self {
        Self {
            status: status.status,
            message: status.message.to_string(),
            published_at: format_optional(status.published_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub user_id: String,
    pub ai_task_id: Option<Uuid>,
    pub title: String,
    pub theme: String,
    pub content: String,
    pub section_html: Option<String>,
    pub status: ArticleStatus,
    pub is_public: bool,
    #[schema(value_type = Vec<String>)]
    pub tags: JsonValue,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ArticleEditTask> for ArticleResponse {
    fn from(article: ArticleEditTask) -> Self {
        Self {
            published_at: format_optional(article.published_at),
            created_at: format_timestamp(article.created_at),
            updated_at: format_timestamp(article.updated_at),
            id: article.id,
            user_id: article.user_id,
            ai_task_id: article.ai_task_id,
            title: article.title,
            theme: article.theme,
            content: article.content,
            section_html: article.section_html,
            status: article.status,
            is_public: article.is_public,
            tags: article.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_request_defaults_to_draft() {
        let req: PublishArticleRequest = serde_json::from_str("{}").unwrap();
        assert!(!PublishRequest::from(req).sync_online);
    }

    #[test]
    fn test_publish_status_message() {
        let response = PublishStatusResponse::from(PublishStatus {
            status: ArticleStatus::Pending,
            message: ArticleStatus::Pending.message(),
            published_at: None,
        });
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["message"], "Publishing");
        assert!(json["published_at"].is_null());
    }
}
