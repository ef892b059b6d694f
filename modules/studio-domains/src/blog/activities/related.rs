use sqlx::PgPool;
use studio_common::related;
use uuid::Uuid;

use crate::blog::models::BlogPost;
use crate::deps::StudioDeps;
use crate::error::Result;

/// Posts related to `post_id`, using the configured default limit when `limit` is `None`.
pub async fn related_posts(post_id: Uuid, limit: Option<usize>, deps: &StudioDeps) -> Result<Vec<BlogPost>> {
    let ranking = deps.ranking();
    let limit = limit.unwrap_or(ranking.default_limit);
    related_posts_with(post_id, limit, ranking.candidate_pool_size, deps.pool()).await
}

pub async fn related_posts_with(
    post_id: Uuid,
    limit: usize,
    pool_size: usize,
    pool: &PgPool,
) -> Result<Vec<BlogPost>> {
    let post = BlogPost::find_by_id(post_id, pool).await?;
    let candidates = BlogPost::ranking_pool(&post, pool_size.max(limit), pool).await?;
    Ok(related(&post, &candidates, limit).into_iter().cloned().collect())
}
