use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::progress::{completion_rate, round2};
use crate::blog::models::BlogPost;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostAnalytics {
    pub likes: i64,
    pub bookmarks: i64,
    pub shares: i64,
    pub comments: i64,
    pub total_readers: i64,
    pub completed_readers: i64,
    pub completion_rate: f64,
    pub average_progress: f64,
}

/// Engagement and reading numbers for one post, counted from the join tables.
pub async fn post_analytics(post_id: Uuid, pool: &PgPool) -> Result<PostAnalytics> {
    BlogPost::find_by_id(post_id, pool).await?;

    let (likes, bookmarks, shares, comments): (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM blog_post_likes WHERE post_id = $1),
            (SELECT COUNT(*) FROM blog_post_bookmarks WHERE post_id = $1),
            (SELECT COUNT(*) FROM blog_post_shares WHERE post_id = $1),
            (SELECT COUNT(*) FROM blog_post_comments WHERE post_id = $1 AND is_approved)
        "#,
    )
    .bind(post_id)
    .fetch_one(pool)
    .await?;

    let (readers, completed, average): (i64, i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE is_completed), AVG(progress_percentage)::FLOAT8
        FROM reading_progress
        WHERE post_id = $1
        "#,
    )
    .bind(post_id)
    .fetch_one(pool)
    .await?;

    Ok(PostAnalytics {
        likes,
        bookmarks,
        shares,
        comments,
        total_readers: readers,
        completed_readers: completed,
        completion_rate: completion_rate(completed, readers),
        average_progress: round2(average.unwrap_or(0.0)),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EngagedPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Likes + bookmarks + shares.
    pub engagement: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformAnalytics {
    pub total_posts: i64,
    pub total_likes: i64,
    pub total_bookmarks: i64,
    pub total_shares: i64,
    pub total_comments: i64,
    pub popular_posts: Vec<EngagedPost>,
}

pub const POPULAR_POSTS: i64 = 5;

pub async fn platform_analytics(pool: &PgPool) -> Result<PlatformAnalytics> {
    let (total_posts, total_likes, total_bookmarks, total_shares, total_comments): (i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM blog_posts WHERE status = 'published'),
                (SELECT COUNT(*) FROM blog_post_likes),
                (SELECT COUNT(*) FROM blog_post_bookmarks),
                (SELECT COUNT(*) FROM blog_post_shares),
                (SELECT COUNT(*) FROM blog_post_comments WHERE is_approved)
            "#,
        )
        .fetch_one(pool)
        .await?;

    let popular_posts = sqlx::query_as::<_, EngagedPost>(
        r#"
        SELECT p.id, p.title, p.slug,
            (SELECT COUNT(*) FROM blog_post_likes l WHERE l.post_id = p.id)
          + (SELECT COUNT(*) FROM blog_post_bookmarks b WHERE b.post_id = p.id)
          + (SELECT COUNT(*) FROM blog_post_shares s WHERE s.post_id = p.id) AS engagement
        FROM blog_posts p
        WHERE p.status = 'published'
        ORDER BY engagement DESC, p.published_at DESC
        LIMIT $1
        "#,
    )
    .bind(POPULAR_POSTS)
    .fetch_all(pool)
    .await?;

    Ok(PlatformAnalytics {
        total_posts,
        total_likes,
        total_bookmarks,
        total_shares,
        total_comments,
        popular_posts,
    })
}
