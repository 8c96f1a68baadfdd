use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::BlogPostStatus")]
#[serde(rename_all = "snake_case")]
pub enum BlogPostStatus {
    Draft,
    Published,
    Archived,
}

impl BlogPostStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(BlogPostStatus::Draft),
            "published" => Some(BlogPostStatus::Published),
            "archived" => Some(BlogPostStatus::Archived),
            _ => None,
        }
    }
}

/// Category keys accepted for blog posts, with their display names.
pub const BLOG_CATEGORIES: &[(&str, &str)] = &[
    ("product-updates", "Product Updates"),
    ("tutorials", "Tutorials"),
    ("tips-and-tricks", "Tips & Tricks"),
    ("industry-insights", "Industry Insights"),
    ("case-studies", "Case Studies"),
];

pub fn is_valid_category(key: &str) -> bool {
    BLOG_CATEGORIES.iter().any(|(k, _)| *k == key)
}

pub const DEFAULT_AUTHOR: &str = "Inkdesk Team";

#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::blog_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    pub cover_image: Option<String>,
    pub author: String,
    pub author_avatar: Option<String>,
    pub publish_date: NaiveDateTime,
    pub updated_date: Option<NaiveDateTime>,
    pub read_time: i32,
    pub views: i32,
    pub likes: i32,
    pub is_featured: bool,
    pub seo_description: Option<String>,
    pub status: BlogPostStatus,
    pub theme_name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::blog_posts)]
pub struct NewBlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    pub cover_image: Option<String>,
    pub author: String,
    pub author_avatar: Option<String>,
    pub publish_date: NaiveDateTime,
    pub read_time: i32,
    pub is_featured: bool,
    pub seo_description: Option<String>,
    pub status: BlogPostStatus,
    pub theme_name: Option<String>,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::blog_posts)]
pub struct UpdateBlogPost {
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
    pub status: Option<BlogPostStatus>,
    pub theme_name: Option<String>,
    pub updated_date: Option<NaiveDateTime>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::blog_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlogTag {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::blog_tags)]
pub struct NewBlogTag<'a> {
    pub name: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::blog_post_tags)]
pub struct NewBlogPostTag<'a> {
    pub post_id: &'a str,
    pub tag_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::blog_seo_keywords)]
pub struct NewBlogSeoKeyword<'a> {
    pub post_id: &'a str,
    pub keyword: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(is_valid_category("tutorials"));
        assert!(is_valid_category("case-studies"));
        assert!(!is_valid_category("Tutorials"));
        assert!(!is_valid_category(""));
        assert_eq!(BLOG_CATEGORIES.len(), 5);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BlogPostStatus::parse("archived"), Some(BlogPostStatus::Archived));
        assert_eq!(BlogPostStatus::parse("deleted"), None);
    }
}
