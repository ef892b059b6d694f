use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::{
    Category, CategoryRef, ContentStatus, Difficulty, NewPost, Ownable, Popularity, Rankable,
};
use uuid::Uuid;

use crate::error::{duplicate_on_conflict, DomainError, Result};
use crate::query_helpers::{append_pagination, append_post_filters, sql_limit, PostFilters};

/// Columns selected for every post query; the category join feeds `Category::resolve`.
const POST_SELECT: &str = r#"
    SELECT p.*, c.slug AS category_slug, c.name AS category_name
    FROM blog_posts p
    LEFT JOIN blog_categories c ON c.id = p.category_id
"#;

/// Raw row as stored, before the category is resolved.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    summary: String,
    excerpt: String,
    body: String,
    author_id: Uuid,
    category_id: Option<Uuid>,
    legacy_category: Option<String>,
    tags: Vec<String>,
    status: String,
    difficulty: String,
    is_featured: bool,
    published_at: Option<DateTime<Utc>>,
    word_count: i32,
    reading_time: i32,
    view_count: i64,
    like_count: i64,
    bookmark_count: i64,
    share_count: i64,
    comment_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_slug: Option<String>,
    category_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub excerpt: String,
    pub body: String,
    pub author_id: Uuid,
    pub category: Category,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub difficulty: Difficulty,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub word_count: i32,
    pub reading_time: i32,
    pub view_count: i64,
    pub like_count: i64,
    pub bookmark_count: i64,
    pub share_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Result<BlogPost> {
        let row = self;
        let status = ContentStatus::from_str_loose(&row.status).ok_or_else(|| {
            DomainError::Other(anyhow::anyhow!("post {} has unknown status {:?}", row.id, row.status))
        })?;
        let reference = match (row.category_id, row.category_slug, row.category_name) {
            (Some(id), Some(slug), Some(name)) => Some(CategoryRef { id, slug, name }),
            _ => None,
        };
        Ok(BlogPost {
            id: row.id,
            title: row.title,
            slug: row.slug,
            summary: row.summary,
            excerpt: row.excerpt,
            body: row.body,
            author_id: row.author_id,
            category: Category::resolve(reference, row.legacy_category.as_deref()),
            tags: row.tags,
            status,
            difficulty: Difficulty::from_str_loose(&row.difficulty).unwrap_or_default(),
            is_featured: row.is_featured,
            published_at: row.published_at,
            word_count: row.word_count,
            reading_time: row.reading_time,
            view_count: row.view_count,
            like_count: row.like_count,
            bookmark_count: row.bookmark_count,
            share_count: row.share_count,
            comment_count: row.comment_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_posts(rows: Vec<PostRow>) -> Result<Vec<BlogPost>> {
    rows.into_iter().map(PostRow::into_post).collect()
}

impl BlogPost {
    /// Insert a draft. Slug and reading time come from the factory.
    pub async fn create(new: &NewPost, pool: &PgPool) -> Result<Self> {
        let legacy = match new.category() {
            Category::Legacy(slug) => Some(slug.as_str()),
            _ => None,
        };
        let (id,) = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO blog_posts (
                title, slug, summary, excerpt, body, author_id, category_id, legacy_category,
                tags, difficulty, is_featured, word_count, reading_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(new.title())
        .bind(new.slug())
        .bind(new.summary())
        .bind(new.excerpt())
        .bind(new.body())
        .bind(new.author_id())
        .bind(new.category().id())
        .bind(legacy)
        .bind(new.tags())
        .bind(new.difficulty().as_str())
        .bind(new.is_featured())
        .bind(new.word_count() as i32)
        .bind(new.reading_time() as i32)
        .fetch_one(pool)
        .await
        .map_err(duplicate_on_conflict("a post with this slug already exists"))?;

        tracing::info!(post_id = %id, slug = new.slug(), "Blog post created");
        Self::find_by_id(id, pool).await
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))?
            .into_post()
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("post", slug))?
            .into_post()
    }

    /// A post that is published and visible now, for engagement actions.
    pub async fn find_published(id: Uuid, pool: &PgPool) -> Result<Self> {
        let post = Self::find_by_id(id, pool).await?;
        if post.is_visible(Utc::now()) {
            Ok(post)
        } else {
            Err(DomainError::not_found("post", id))
        }
    }

    /// Published posts matching `filters`, newest first.
    pub async fn list_published(filters: &PostFilters, pool: &PgPool) -> Result<Vec<Self>> {
        let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new(POST_SELECT);
        qb.push(" WHERE p.status = 'published' AND p.published_at <= NOW() ");
        append_post_filters(&mut qb, filters, "p", "c");
        qb.push(" ORDER BY p.published_at DESC, p.id ");
        append_pagination(&mut qb, filters.limit, filters.offset);

        let rows = qb.build_query_as::<PostRow>().fetch_all(pool).await?;
        into_posts(rows)
    }

    pub async fn featured(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.status = 'published' AND p.published_at <= NOW() AND p.is_featured \
             ORDER BY p.published_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;
        into_posts(rows)
    }

    pub async fn popular(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.status = 'published' AND p.published_at <= NOW() \
             ORDER BY p.view_count DESC, p.published_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;
        into_posts(rows)
    }

    /// Published candidates for related-content ranking. Posts sharing the
    /// category or a tag with `post` come first so they survive the size cap,
    /// then the most viewed and most recent of the rest.
    pub async fn ranking_pool(post: &BlogPost, size: usize, pool: &PgPool) -> Result<Vec<Self>> {
        let tags: Vec<String> = post.tags.iter().map(|t| t.trim().to_lowercase()).collect();
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"{POST_SELECT}
            WHERE p.status = 'published' AND p.published_at <= NOW() AND p.id <> $1
            ORDER BY
                COALESCE(
                    COALESCE(c.slug, p.legacy_category) = $2
                    OR EXISTS (SELECT 1 FROM unnest(p.tags) t WHERE lower(trim(t)) = ANY($3)),
                    FALSE
                ) DESC,
                p.view_count DESC, p.published_at DESC
            LIMIT $4"#
        ))
        .bind(post.id)
        .bind(post.category.key())
        .bind(&tags)
        .bind(sql_limit(size))
        .fetch_all(pool)
        .await?;
        into_posts(rows)
    }

    /// Move through the draft/published/archived lifecycle.
    pub async fn set_status(id: Uuid, to: ContentStatus, pool: &PgPool) -> Result<Self> {
        let post = Self::find_by_id(id, pool).await?;
        let change = post.status.transition(to, post.published_at, Utc::now())?;

        sqlx::query(
            "UPDATE blog_posts SET status = $2, published_at = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(change.status.as_str())
        .bind(change.published_at)
        .execute(pool)
        .await?;

        tracing::info!(post_id = %id, from = %post.status, to = %change.status, "Post status changed");
        Self::find_by_id(id, pool).await
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.status == ContentStatus::Published && self.published_at.is_some_and(|at| at <= now)
    }
}

impl Rankable for BlogPost {
    fn rank_id(&self) -> Uuid {
        self.id
    }
    fn category(&self) -> &Category {
        &self.category
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn popularity(&self) -> Popularity {
        Popularity {
            views: self.view_count,
            likes: self.like_count,
        }
    }
    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
    fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }
}

impl Ownable for BlogPost {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.author_id)
    }
}
