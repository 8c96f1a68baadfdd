//! Blog CMS: the public reader side and admin editing.

use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    is_valid_category, BlogPost, BlogPostStatus, NewBlogPost, UpdateBlogPost, BLOG_CATEGORIES,
    DEFAULT_AUTHOR,
};
use crate::repositories::{BlogFilter, BlogRepository, BlogStats};
use crate::utils::time::now;

pub const BLOG_DEFAULT_PAGE_SIZE: i64 = 10;
pub const RELATED_DEFAULT_LIMIT: i64 = 3;
const WORDS_PER_MINUTE: usize = 200;

/// Out-of-range page sizes fall back to the default instead of being clamped.
pub fn normalize_page_size(page_size: Option<i64>) -> i64 {
    match page_size {
        Some(size) if (1..=100).contains(&size) => size,
        _ => BLOG_DEFAULT_PAGE_SIZE,
    }
}

pub fn normalize_related_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(limit) if (1..=10).contains(&limit) => limit,
        _ => RELATED_DEFAULT_LIMIT,
    }
}

/// Reading time in whole minutes, at least one.
pub fn estimate_read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

fn validate_category(category: &str) -> AppResult<()> {
    if is_valid_category(category) {
        Ok(())
    } else {
        Err(AppError::bad_request(format!("Invalid category: {}", category)))
    }
}

fn parse_status(status: &str) -> AppResult<BlogPostStatus> {
    BlogPostStatus::parse(status)
        .ok_or_else(|| AppError::bad_request(format!("Invalid status: {}", status)))
}

/// A post with the lists stored beside it.
#[derive(Debug, Clone)]
pub struct BlogPostDetail {
    pub post: BlogPost,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BlogPostInput {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub author_avatar: Option<String>,
    pub publish_date: Option<NaiveDateTime>,
    pub read_time: Option<i32>,
    pub is_featured: bool,
    pub seo_description: Option<String>,
    pub status: Option<String>,
    pub theme_name: Option<String>,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BlogPostPatch {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub author_avatar: Option<String>,
    pub read_time: Option<i32>,
    pub is_featured: Option<bool>,
    pub seo_description: Option<String>,
    pub status: Option<String>,
    pub theme_name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct BlogService {
    repo: BlogRepository,
}

impl BlogService {
    pub fn new(repo: BlogRepository) -> Self {
        Self { repo }
    }

    /// Published posts with their tags.
    pub async fn list(
        &self,
        filter: BlogFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<BlogPostDetail>, i64)> {
        let (posts, total) = self.repo.list_published(&filter, offset, limit).await?;
        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let mut tags = self.repo.tags_for(&ids).await?;

        let details = posts
            .into_iter()
            .map(|post| BlogPostDetail {
                tags: tags.remove(&post.id).unwrap_or_default(),
                keywords: Vec::new(),
                post,
            })
            .collect();
        Ok((details, total))
    }

    async fn detail(&self, post: BlogPost) -> AppResult<BlogPostDetail> {
        let tags = self
            .repo
            .tags_for(std::slice::from_ref(&post.id))
            .await?
            .remove(&post.id)
            .unwrap_or_default();
        let keywords = self.repo.keywords_for(&post.id).await?;
        Ok(BlogPostDetail {
            post,
            tags,
            keywords,
        })
    }

    async fn published(&self, slug: &str) -> AppResult<BlogPost> {
        self.repo
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("blog_posts", "slug", slug))
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<BlogPostDetail> {
        let post = self.published(slug).await?;
        self.detail(post).await
    }

    pub async fn related(&self, slug: &str, limit: Option<i64>) -> AppResult<Vec<BlogPost>> {
        let post = self.published(slug).await?;
        self.repo.related(&post, normalize_related_limit(limit)).await
    }

    pub async fn record_view(&self, slug: &str) -> AppResult<i32> {
        self.repo
            .increment_views(slug)
            .await?
            .ok_or_else(|| AppError::not_found("blog_posts", "slug", slug))
    }

    pub async fn like(&self, slug: &str) -> AppResult<i32> {
        self.repo
            .like(slug)
            .await?
            .ok_or_else(|| AppError::not_found("blog_posts", "slug", slug))
    }

    pub async fn unlike(&self, slug: &str) -> AppResult<i32> {
        self.repo
            .unlike(slug)
            .await?
            .ok_or_else(|| AppError::not_found("blog_posts", "slug", slug))
    }

    /// `(slug, last modification)` of each published post.
    pub async fn sitemap(&self) -> AppResult<Vec<(String, NaiveDateTime)>> {
        let rows = self.repo.sitemap().await?;
        Ok(rows
            .into_iter()
            .map(|(slug, updated, published)| (slug, updated.unwrap_or(published)))
            .collect())
    }

    pub fn categories(&self) -> &'static [(&'static str, &'static str)] {
        BLOG_CATEGORIES
    }

    pub async fn create(&self, input: BlogPostInput) -> AppResult<BlogPostDetail> {
        validate_category(&input.category)?;
        let status = match input.status.as_deref() {
            Some(s) => parse_status(s)?,
            None => BlogPostStatus::Published,
        };
        if self.repo.slug_taken(&input.slug, None).await? {
            return Err(AppError::Duplicate {
                entity: "blog_posts".to_string(),
                field: "slug".to_string(),
                value: input.slug,
            });
        }

        let read_time = input
            .read_time
            .filter(|t| *t > 0)
            .unwrap_or_else(|| estimate_read_time(&input.content));
        let post = NewBlogPost {
            id: Uuid::new_v4().to_string(),
            slug: input.slug,
            title: input.title,
            summary: input.summary,
            content: input.content,
            category: input.category,
            cover_image: input.cover_image,
            author: input
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            author_avatar: input.author_avatar,
            publish_date: input.publish_date.unwrap_or_else(now),
            read_time,
            is_featured: input.is_featured,
            seo_description: input.seo_description,
            status,
            theme_name: input.theme_name,
        };

        let created = self.repo.create(post, input.tags, input.keywords).await?;
        info!(post_id = %created.id, slug = %created.slug, "Blog post created");
        self.detail(created).await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<BlogPostDetail> {
        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("blog_posts", "id", id))?;
        self.detail(post).await
    }

    pub async fn update(&self, id: &str, patch: BlogPostPatch) -> AppResult<BlogPostDetail> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("blog_posts", "id", id))?;

        if let Some(category) = &patch.category {
            validate_category(category)?;
        }
        let status = patch.status.as_deref().map(parse_status).transpose()?;
        if let Some(slug) = &patch.slug
            && self.repo.slug_taken(slug, Some(id)).await?
        {
            return Err(AppError::Duplicate {
                entity: "blog_posts".to_string(),
                field: "slug".to_string(),
                value: slug.clone(),
            });
        }

        let changes = UpdateBlogPost {
            slug: patch.slug,
            title: patch.title,
            summary: patch.summary,
            content: patch.content,
            category: patch.category,
            cover_image: patch.cover_image,
            author: patch.author,
            author_avatar: patch.author_avatar,
            read_time: patch.read_time,
            is_featured: patch.is_featured,
            seo_description: patch.seo_description,
            status,
            theme_name: patch.theme_name,
            updated_date: Some(now()),
        };

        let updated = self.repo.update(id, changes, patch.tags, patch.keywords).await?;
        info!(post_id = id, "Blog post updated");
        self.detail(updated).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let removed = self.repo.delete(id).await?;
        if removed == 0 {
            return Err(AppError::not_found("blog_posts", "id", id));
        }
        info!(post_id = id, "Blog post deleted");
        Ok(())
    }

    pub async fn stats(&self) -> AppResult<BlogStats> {
        self.repo.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_size_resets_instead_of_clamping() {
        assert_eq!(normalize_page_size(None), 10);
        assert_eq!(normalize_page_size(Some(0)), 10);
        assert_eq!(normalize_page_size(Some(101)), 10);
        assert_eq!(normalize_page_size(Some(100)), 100);
        assert_eq!(normalize_page_size(Some(25)), 25);
    }

    #[test]
    fn test_related_limit() {
        assert_eq!(normalize_related_limit(None), 3);
        assert_eq!(normalize_related_limit(Some(11)), 3);
        assert_eq!(normalize_related_limit(Some(10)), 10);
    }

    #[test]
    fn test_read_time() {
        assert_eq!(estimate_read_time(""), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(200)), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(201)), 2);
    }

    #[test]
    fn test_invalid_category_and_status() {
        assert!(matches!(validate_category("news"), Err(AppError::BadRequest { .. })));
        assert!(matches!(parse_status("hidden"), Err(AppError::BadRequest { .. })));
        assert_eq!(parse_status("draft").unwrap(), BlogPostStatus::Draft);
    }

    proptest! {
        #[test]
        fn prop_page_size_always_in_range(size in any::<i64>()) {
            let normalized = normalize_page_size(Some(size));
            prop_assert!((1..=100).contains(&normalized));
        }
    }
}
