//! Blog posts together with their tags and SEO keywords.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    BlogPost, BlogPostStatus, NewBlogPost, NewBlogPostTag, NewBlogSeoKeyword, NewBlogTag,
    UpdateBlogPost,
};
use crate::repositories::contains_pattern;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlogSort {
    #[default]
    Latest,
    Popular,
    Oldest,
}

/// Filters for the public post list. Only published posts are returned.
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub keyword: Option<String>,
    pub is_featured: Option<bool>,
    pub sort: BlogSort,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct BlogStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub featured: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub by_category: Vec<(String, i64)>,
    pub total_tags: i64,
}

async fn attach_tags(
    conn: &mut AsyncPgConnection,
    post: &str,
    tags: &[String],
) -> AppResult<()> {
    use crate::schema::{blog_post_tags, blog_tags};

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        diesel::insert_into(blog_tags::table)
            .values(&NewBlogTag { name: tag })
            .on_conflict(blog_tags::name)
            .do_nothing()
            .execute(conn)
            .await?;
        let tag_id: i32 = blog_tags::table
            .filter(blog_tags::name.eq(tag))
            .select(blog_tags::id)
            .first(conn)
            .await?;
        diesel::insert_into(blog_post_tags::table)
            .values(&NewBlogPostTag {
                post_id: post,
                tag_id,
            })
            .on_conflict((blog_post_tags::post_id, blog_post_tags::tag_id))
            .do_nothing()
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn attach_keywords(
    conn: &mut AsyncPgConnection,
    post: &str,
    keywords: &[String],
) -> AppResult<()> {
    use crate::schema::blog_seo_keywords;

    let rows: Vec<NewBlogSeoKeyword<'_>> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|keyword| NewBlogSeoKeyword {
            post_id: post,
            keyword,
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(blog_seo_keywords::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct BlogRepository {
    pool: AsyncDbPool,
}

impl BlogRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn list_published(
        &self,
        filter: &BlogFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<BlogPost>, i64)> {
        use crate::schema::{blog_post_tags, blog_posts, blog_tags};
        let mut conn = self.pool.get().await?;

        let build = || {
            let mut query = blog_posts::table
                .filter(blog_posts::status.eq(BlogPostStatus::Published))
                .into_boxed();
            if let Some(category) = &filter.category {
                query = query.filter(blog_posts::category.eq(category.clone()));
            }
            if let Some(featured) = filter.is_featured {
                query = query.filter(blog_posts::is_featured.eq(featured));
            }
            if let Some(kw) = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
                let pattern = contains_pattern(kw);
                query = query.filter(
                    blog_posts::title
                        .ilike(pattern.clone())
                        .or(blog_posts::summary.ilike(pattern)),
                );
            }
            if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
                let tagged = blog_post_tags::table
                    .inner_join(blog_tags::table)
                    .filter(blog_tags::name.eq(tag.to_string()))
                    .select(blog_post_tags::post_id);
                query = query.filter(blog_posts::id.eq_any(tagged));
            }
            query
        };

        let ordered = match filter.sort {
            BlogSort::Latest => build().order((blog_posts::publish_date.desc(), blog_posts::id.asc())),
            BlogSort::Popular => build().order((blog_posts::views.desc(), blog_posts::publish_date.desc())),
            BlogSort::Oldest => build().order((blog_posts::publish_date.asc(), blog_posts::id.asc())),
        };

        let posts = ordered
            .offset(offset)
            .limit(limit)
            .select(BlogPost::as_select())
            .load(&mut conn)
            .await?;
        let total = build().count().get_result::<i64>(&mut conn).await?;

        Ok((posts, total))
    }

    pub async fn find_published_by_slug(&self, slug_value: &str) -> AppResult<Option<BlogPost>> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        blog_posts
            .filter(slug.eq(slug_value))
            .filter(status.eq(BlogPostStatus::Published))
            .select(BlogPost::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, post_id: &str) -> AppResult<Option<BlogPost>> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        blog_posts
            .find(post_id)
            .select(BlogPost::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Tag names per post, in insertion order.
    pub async fn tags_for(&self, post_ids: &[String]) -> AppResult<HashMap<String, Vec<String>>> {
        use crate::schema::{blog_post_tags, blog_tags};
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await?;

        let rows: Vec<(String, String)> = blog_post_tags::table
            .inner_join(blog_tags::table)
            .filter(blog_post_tags::post_id.eq_any(post_ids))
            .order(blog_post_tags::id.asc())
            .select((blog_post_tags::post_id, blog_tags::name))
            .load(&mut conn)
            .await?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for (post, name) in rows {
            grouped.entry(post).or_default().push(name);
        }
        Ok(grouped)
    }

    pub async fn keywords_for(&self, post: &str) -> AppResult<Vec<String>> {
        use crate::schema::blog_seo_keywords::dsl::*;
        let mut conn = self.pool.get().await?;

        blog_seo_keywords
            .filter(post_id.eq(post))
            .order(id.asc())
            .select(keyword)
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn related(
        &self,
        post: &BlogPost,
        limit: i64,
    ) -> AppResult<Vec<BlogPost>> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        blog_posts
            .filter(status.eq(BlogPostStatus::Published))
            .filter(category.eq(&post.category))
            .filter(id.ne(&post.id))
            .order(publish_date.desc())
            .limit(limit)
            .select(BlogPost::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Bumps a published post's view counter, returning the new value.
    pub async fn increment_views(&self, slug_value: &str) -> AppResult<Option<i32>> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(
            blog_posts
                .filter(slug.eq(slug_value))
                .filter(status.eq(BlogPostStatus::Published)),
        )
        .set(views.eq(views + 1))
        .returning(views)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(AppError::from)
    }

    pub async fn like(&self, slug_value: &str) -> AppResult<Option<i32>> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(
            blog_posts
                .filter(slug.eq(slug_value))
                .filter(status.eq(BlogPostStatus::Published)),
        )
        .set(likes.eq(likes + 1))
        .returning(likes)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(AppError::from)
    }

    /// Decrements likes without going below zero. Returns the current count,
    /// or `None` when no published post has this slug.
    pub async fn unlike(&self, slug_value: &str) -> AppResult<Option<i32>> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        let updated: Option<i32> = diesel::update(
            blog_posts
                .filter(slug.eq(slug_value))
                .filter(status.eq(BlogPostStatus::Published))
                .filter(likes.gt(0)),
        )
        .set(likes.eq(likes - 1))
        .returning(likes)
        .get_result(&mut conn)
        .await
        .optional()?;

        if updated.is_some() {
            return Ok(updated);
        }

        blog_posts
            .filter(slug.eq(slug_value))
            .filter(status.eq(BlogPostStatus::Published))
            .select(likes)
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// `(slug, updated_date, publish_date)` for every published post.
    pub async fn sitemap(&self) -> AppResult<Vec<(String, Option<NaiveDateTime>, NaiveDateTime)>> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        blog_posts
            .filter(status.eq(BlogPostStatus::Published))
            .order(publish_date.desc())
            .select((slug, updated_date, publish_date))
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn slug_taken(&self, slug_value: &str, except: Option<&str>) -> AppResult<bool> {
        use crate::schema::blog_posts::dsl::*;
        let mut conn = self.pool.get().await?;

        let mut query = blog_posts.filter(slug.eq(slug_value)).into_boxed();
        if let Some(except) = except {
            query = query.filter(id.ne(except.to_string()));
        }
        let count: i64 = query.count().get_result(&mut conn).await?;
        Ok(count > 0)
    }

    /// Inserts the post with its tags and keywords in one transaction.
    /// Unknown tags are created on the way.
    pub async fn create(
        &self,
        post: NewBlogPost,
        tags: Vec<String>,
        keywords: Vec<String>,
    ) -> AppResult<BlogPost> {
        use crate::schema::blog_posts;
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let created = diesel::insert_into(blog_posts::table)
                    .values(&post)
                    .returning(BlogPost::as_returning())
                    .get_result(conn)
                    .await?;

                attach_tags(conn, &created.id, &tags).await?;
                attach_keywords(conn, &created.id, &keywords).await?;

                Ok(created)
            }
            .scope_boxed()
        })
        .await
    }

    /// Partial update. Tags and keywords are replaced wholesale when given.
    pub async fn update(
        &self,
        post_id: &str,
        changes: UpdateBlogPost,
        tags: Option<Vec<String>>,
        keywords: Option<Vec<String>>,
    ) -> AppResult<BlogPost> {
        use crate::schema::{blog_post_tags, blog_posts, blog_seo_keywords};
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let updated = diesel::update(blog_posts::table.find(post_id))
                    .set(&changes)
                    .returning(BlogPost::as_returning())
                    .get_result(conn)
                    .await?;

                if let Some(tags) = tags {
                    diesel::delete(blog_post_tags::table.filter(blog_post_tags::post_id.eq(post_id)))
                        .execute(conn)
                        .await?;
                    attach_tags(conn, post_id, &tags).await?;
                }
                if let Some(keywords) = keywords {
                    diesel::delete(
                        blog_seo_keywords::table.filter(blog_seo_keywords::post_id.eq(post_id)),
                    )
                    .execute(conn)
                    .await?;
                    attach_keywords(conn, post_id, &keywords).await?;
                }

                Ok(updated)
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn delete(&self, post_id: &str) -> AppResult<usize> {
        use crate::schema::{blog_post_tags, blog_posts, blog_seo_keywords};
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                diesel::delete(blog_post_tags::table.filter(blog_post_tags::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(blog_seo_keywords::table.filter(blog_seo_keywords::post_id.eq(post_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(blog_posts::table.find(post_id))
                    .execute(conn)
                    .await
                    .map_err(AppError::from)
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn stats(&self) -> AppResult<BlogStats> {
        use crate::schema::{blog_posts, blog_tags};
        let mut conn = self.pool.get().await?;

        let by_status: Vec<(BlogPostStatus, i64)> = blog_posts::table
            .group_by(blog_posts::status)
            .select((blog_posts::status, count_star()))
            .load(&mut conn)
            .await?;

        let featured: i64 = blog_posts::table
            .filter(blog_posts::is_featured.eq(true))
            .count()
            .get_result(&mut conn)
            .await?;

        let (views, likes): (Option<i64>, Option<i64>) = blog_posts::table
            .select((sum(blog_posts::views), sum(blog_posts::likes)))
            .first(&mut conn)
            .await?;

        let by_category: Vec<(String, i64)> = blog_posts::table
            .group_by(blog_posts::category)
            .select((blog_posts::category, count_star()))
            .order(blog_posts::category.asc())
            .load(&mut conn)
            .await?;

        let total_tags: i64 = blog_tags::table.count().get_result(&mut conn).await?;

        let mut stats = BlogStats {
            featured,
            total_views: views.unwrap_or(0),
            total_likes: likes.unwrap_or(0),
            by_category,
            total_tags,
            ..Default::default()
        };
        for (state, count) in by_status {
            stats.total += count;
            match state {
                BlogPostStatus::Published => stats.published = count,
                BlogPostStatus::Draft => stats.draft = count,
                BlogPostStatus::Archived => stats.archived = count,
            }
        }
        Ok(stats)
    }
}
