//! Article editing and the simulated background publish.

use std::time::Duration;

use chrono::NaiveDateTime;
use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{Event, Tag, html};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ArticleEditTask, ArticleStatus, NewArticleEditTask, UpdateArticleEditTask};
use crate::repositories::{ArticleRepository, UserRepository};
use crate::utils::time::now;

pub const DEFAULT_THEME: &str = "default";

fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

/// Renders `content` into a themed section. Paragraphs are separated by
/// blank lines and emitted as text events, so markup in the content is
/// escaped rather than interpreted.
pub fn render_section_html(content: &str, theme: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let mut events = Vec::new();
    for paragraph in normalized.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        events.push(Event::Start(Tag::Paragraph));
        events.push(Event::Text(paragraph.into()));
        events.push(Event::End(Tag::Paragraph));
    }

    let mut body = String::with_capacity(normalized.len() + 16);
    html::push_html(&mut body, events.into_iter());
    format!(
        "<section class=\"theme-{}\">{}</section>",
        escaped(theme),
        body.replace("</p>\n", "</p>")
    )
}

#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub theme: Option<String>,
    pub ai_task_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub theme: Option<String>,
    pub status: Option<ArticleStatus>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub digest: Option<String>,
    pub sync_online: bool,
}

#[derive(Debug, Clone)]
pub struct PublishStatus {
    pub status: ArticleStatus,
    pub message: &'static str,
    pub published_at: Option<NaiveDateTime>,
}

#[derive(Clone)]
pub struct ArticleService {
    repo: ArticleRepository,
    users: UserRepository,
    publish_delay: Duration,
}

impl ArticleService {
    pub fn new(repo: ArticleRepository, users: UserRepository, publish_delay_ms: u64) -> Self {
        Self {
            repo,
            users,
            publish_delay: Duration::from_millis(publish_delay_ms),
        }
    }

    pub async fn create(&self, user_id: &str, draft: ArticleDraft) -> AppResult<ArticleEditTask> {
        let theme = draft
            .theme
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_THEME.to_string());
        let section_html = render_section_html(&draft.content, &theme);

        let article = self
            .repo
            .create(NewArticleEditTask {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                ai_task_id: draft.ai_task_id,
                title: draft.title,
                theme,
                content: draft.content,
                section_html: Some(section_html),
                status: ArticleStatus::Editing,
                is_public: draft.is_public,
                tags: serde_json::json!(draft.tags),
            })
            .await?;
        info!(article_id = %article.id, user_id, "Article created");
        Ok(article)
    }

    pub async fn list(&self, user_id: &str, offset: i64, limit: i64) -> AppResult<(Vec<ArticleEditTask>, i64)> {
        self.repo.list_by_user(user_id, offset, limit).await
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> AppResult<ArticleEditTask> {
        let article = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("article_edit_tasks", "id", id))?;
        if article.user_id != user_id {
            return Err(AppError::forbidden("Article belongs to another user"));
        }
        Ok(article)
    }

    pub async fn update(&self, user_id: &str, id: Uuid, changes: ArticleChanges) -> AppResult<ArticleEditTask> {
        let current = self.get(user_id, id).await?;

        // section_html tracks content and theme
        let section_html = if changes.content.is_some() || changes.theme.is_some() {
            let content = changes.content.as_deref().unwrap_or(&current.content);
            let theme = changes.theme.as_deref().unwrap_or(&current.theme);
            Some(render_section_html(content, theme))
        } else {
            None
        };
        let published_at = (changes.status == Some(ArticleStatus::Published)).then(now);

        self.repo
            .update(
                id,
                UpdateArticleEditTask {
                    title: changes.title,
                    theme: changes.theme,
                    content: changes.content,
                    section_html,
                    status: changes.status,
                    is_public: changes.is_public,
                    tags: changes.tags.map(|t| serde_json::json!(t)),
                    published_at,
                    updated_at: None,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("article_edit_tasks", "id", id))
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> AppResult<()> {
        self.get(user_id, id).await?;
        self.repo.delete(id).await?;
        info!(article_id = %id, "Article deleted");
        Ok(())
    }

    /// Checks ownership, then hands the publish to a background task and
    /// returns straight away.
    pub async fn publish(&self, user_id: &str, id: Uuid, request: PublishRequest) -> AppResult<Uuid> {
        self.get(user_id, id).await?;

        let service = self.clone();
        let owner = user_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = service.run_publish(&owner, id, request).await {
                error!(article_id = %id, error = %e, "Article publish failed");
            }
        });

        info!(article_id = %id, "Article publish scheduled");
        Ok(id)
    }

    async fn run_publish(&self, owner: &str, id: Uuid, request: PublishRequest) -> AppResult<()> {
        let Some(current) = self.repo.find_by_id(id).await? else {
            warn!(article_id = %id, "Article vanished before publish");
            return Ok(());
        };

        let section_html = request
            .content
            .as_deref()
            .map(|content| render_section_html(content, &current.theme));
        self.repo
            .update(
                id,
                UpdateArticleEditTask {
                    title: request.title,
                    content: request.content,
                    section_html,
                    status: Some(ArticleStatus::Pending),
                    ..Default::default()
                },
            )
            .await?;

        tokio::time::sleep(self.publish_delay).await;

        let owner_active = self.users.find_by_id(owner).await?.is_some_and(|u| u.is_active);
        if !owner_active {
            warn!(article_id = %id, owner, "Owner inactive, reverting publish");
            self.revert(id).await?;
            return Ok(());
        }

        let (status, published_at) = if request.sync_online {
            (ArticleStatus::Published, Some(now()))
        } else {
            (ArticleStatus::Draft, None)
        };
        let finished = self
            .repo
            .update(
                id,
                UpdateArticleEditTask {
                    status: Some(status),
                    published_at,
                    ..Default::default()
                },
            )
            .await?;

        match finished {
            Some(article) => info!(
                article_id = %id,
                status = ?article.status,
                digest = ?request.digest,
                "Article publish finished"
            ),
            None => warn!(article_id = %id, "Article vanished during publish"),
        }
        Ok(())
    }

    async fn revert(&self, id: Uuid) -> AppResult<()> {
        self.repo
            .update(
                id,
                UpdateArticleEditTask {
                    status: Some(ArticleStatus::Editing),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    pub async fn publish_status(&self, user_id: &str, id: Uuid) -> AppResult<PublishStatus> {
        let article = self.get(user_id, id).await?;
        Ok(PublishStatus {
            status: article.status,
            message: article.status.message(),
            published_at: article.published_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_splits_paragraphs() {
        let html = render_section_html("First line\n\nSecond\r\n\r\nThird", "ocean");
        assert_eq!(
            html,
            "<section class=\"theme-ocean\"><p>First line</p><p>Second</p><p>Third</p></section>"
        );
    }

    #[test]
    fn test_render_escapes_markup() {
        let html = render_section_html("<script>alert('x') & \"y\"</script>", "default");
        assert!(html.contains("&lt;script&gt;alert('x') &amp; &quot;y&quot;&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_skips_blank_paragraphs() {
        let html = render_section_html("\n\n\n\nOnly\n\n   \n\n", "default");
        assert_eq!(html, "<section class=\"theme-default\"><p>Only</p></section>");
    }

    #[test]
    fn test_render_escapes_theme() {
        let html = render_section_html("x", "a\"b");
        assert!(html.starts_with("<section class=\"theme-a&quot;b\">"));
    }
}
