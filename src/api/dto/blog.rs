//! Blog reader and admin DTOs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::PaginationParams;
use crate::models::{BlogPost, BlogPostStatus};
use crate::repositories::{BlogFilter, BlogSort, BlogStats};
use crate::services::{BlogPostDetail, BlogPostInput, BlogPostPatch, normalize_page_size};
use crate::utils::time::{format_optional, format_timestamp};

/// Public list query. Unlike the other lists, an out-of-range `page_size`
/// falls back to 10.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
pub struct BlogListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub category: Option<String>,
    /// Tag name
    pub tag: Option<String>,
    /// Matches title or summary
    pub keyword: Option<String>,
    pub is_featured: Option<bool>,
    /// latest (default), popular or oldest
    pub sort: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl BlogListQuery {
    pub fn pagination(&self) -> PaginationParams {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        PaginationParams::new(
            u32::try_from(page).unwrap_or(u32::MAX),
            normalize_page_size(self.page_size) as u32,
        )
    }

    pub fn into_filter(self) -> BlogFilter {
        let sort = match self.sort.as_deref() {
            Some("popular") => BlogSort::Popular,
            Some("oldest") => BlogSort::Oldest,
            _ => BlogSort::Latest,
        };
        BlogFilter {
            category: non_blank(self.category),
            tag: non_blank(self.tag),
            keyword: non_blank(self.keyword),
            is_featured: self.is_featured,
            sort,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct RelatedQuery {
    /// Defaults to 3, reset to 3 outside 1..=10
    pub limit: Option<i64>,
}

/// List entry; content is omitted.
#[derive(Debug, Serialize, ToSchema)]
pub struct BlogPostSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub cover_image: Option<String>,
    pub author: String,
    pub author_avatar: Option<String>,
    pub publish_date: String,
    pub updated_date: Option<String>,
    pub read_time: i32,
    pub views: i32,
    pub likes: i32,
    pub is_featured: bool,
    pub status: BlogPostStatus,
    pub tags: Vec<String>,
}

impl BlogPostSummary {
    fn build(post: BlogPost, tags: Vec<String>) -> Self {
        Self {
            publish_date: format_timestamp(post.publish_date),
            updated_date: format_optional(post.updated_date),
            id: post.id,
            slug: post.slug,
            title: post.title,
            summary: post.summary,
            category: post.category,
            cover_image: post.cover_image,
            author: post.author,
            author_avatar: post.author_avatar,
            read_time: post.read_time,
            views: post.views,
            likes: post.likes,
            is_featured: post.is_featured,
            status: post.status,
            tags,
        }
    }
}

impl From<BlogPostDetail> for BlogPostSummary {
    fn from(detail: BlogPostDetail) -> Self {
        Self::build(detail.post, detail.tags)
    }
}

impl From<BlogPost> for BlogPostSummary {
    fn from(post: BlogPost) -> Self {
        Self::build(post, Vec::new())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogPostResponse {
    #[serde(flatten)]
    pub summary: BlogPostSummary,
    pub content: String,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub theme_name: Option<String>,
    pub created_at: String,
}

impl From<BlogPostDetail> for BlogPostResponse {
    fn from(detail: BlogPostDetail) -> Self {
        let BlogPostDetail {
            mut post,
            tags,
            keywords,
        } = detail;
        let content = std::mem::take(&mut post.content);
        let seo_description = post.seo_description.take();
        let theme_name = post.theme_name.take();
        let created_at = format_timestamp(post.created_at);
        Self {
            summary: BlogPostSummary::build(post, tags),
            content,
            seo_description,
            seo_keywords: keywords,
            theme_name,
            created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CounterResponse {
    pub count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SitemapEntry {
    pub slug: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    #[schema(example = "tutorials")]
    pub key: String,
    #[schema(example = "Tutorials")]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBlogPostRequest {
    #[validate(length(min = 1, max = 200, message = "Slug must be between 1 and 200 characters"))]
    pub slug: String,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
    #[schema(example = "tutorials")]
    pub category: String,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub author_avatar: Option<String>,
    #[schema(value_type = Option<String>, example = "2025-07-01T08:00:00")]
    pub publish_date: Option<NaiveDateTime>,
    /// Minutes; estimated from the content when absent
    pub read_time: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
    pub seo_description: Option<String>,
    /// draft, published (default) or archived
    pub status: Option<String>,
    pub theme_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl From<CreateBlogPostRequest> for BlogPostInput {
    fn from(req: CreateBlogPostRequest) -> Self {
        BlogPostInput {
            slug: req.slug,
            title: req.title,
            summary: req.summary,
            content: req.content,
            category: req.category,
            cover_image: req.cover_image,
            author: req.author,
            author_avatar: req.author_avatar,
            publish_date: req.publish_date,
            read_time: req.read_time,
            is_featured: req.is_featured,
            seo_description: req.seo_description,
            status: req.status,
            theme_name: req.theme_name,
            tags: req.tags,
            keywords: req.keywords,
        }
    }
}

/// Partial update. `tags` and `keywords` replace the stored lists when present.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateBlogPostRequest {
    #[validate(length(min = 1, max = 200, message = "Slug must be between 1 and 200 characters"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub author_avatar: Option<String>,
    #[validate(range(min = 1, message = "read_time must be positive"))]
    pub read_time: Option<i32>,
    pub is_featured: Option<bool>,
    pub seo_description: Option<String>,
    pub status: Option<String>,
    pub theme_name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
}

impl From<UpdateBlogPostRequest> for BlogPostPatch {
    fn from(req: UpdateBlogPostRequest) -> Self {
        BlogPostPatch {
            slug: req.slug,
            title: req.title,
            summary: req.summary,
            content: req.content,
            category: req.category,
            cover_image: req.cover_image,
            author: req.author,
            author_avatar: req.author_avatar,
            read_time: req.read_time,
            is_featured: req.is_featured,
            seo_description: req.seo_description,
            status: req.status,
            theme_name: req.theme_name,
            tags: req.tags,
            keywords: req.keywords,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogStatsResponse {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub featured: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub by_category: Vec<CategoryCount>,
    pub total_tags: i64,
}

impl From<BlogStats> for BlogStatsResponse {
    fn from(stats: BlogStats) -> Self {
        Self {
            total: stats.total,
            published: stats.published,
            draft: stats.draft,
            archived: stats.archived,
            featured: stats.featured,
            total_views: stats.total_views,
            total_likes: stats.total_likes,
            by_category: stats
                .by_category
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect(),
            total_tags: stats.total_tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_pagination_defaults() {
        let params = BlogListQuery::default().pagination();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);

        let query = BlogListQuery {
            page: Some(3),
            page_size: Some(500),
            ..Default::default()
        };
        let params = query.pagination();
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_list_query_filter() {
        let filter = BlogListQuery {
            sort: Some("popular".to_string()),
            tag: Some(" rust ".to_string()),
            keyword: Some("".to_string()),
            ..Default::default()
        }
        .into_filter();
        assert_eq!(filter.sort, BlogSort::Popular);
        assert_eq!(filter.tag.as_deref(), Some("rust"));
        assert!(filter.keyword.is_none());

        let fallback = BlogListQuery {
            sort: Some("random".to_string()),
            ..Default::default()
        }
        .into_filter();
        assert_eq!(fallback.sort, BlogSort::Latest);
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateBlogPostRequest = serde_json::from_value(serde_json::json!({
            "slug": "hello",
            "title": "Hello",
            "content": "Body",
            "category": "tutorials"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        let input = BlogPostInput::from(req);
        assert!(input.status.is_none());
        assert!(input.tags.is_empty());
        assert!(!input.is_featured);
    }
}
