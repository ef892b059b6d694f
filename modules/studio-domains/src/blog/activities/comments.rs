use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use studio_common::{ensure_can_modify, Actor};
use tracing::info;
use uuid::Uuid;

use crate::blog::models::{BlogPost, Comment};
use crate::error::{DomainError, Result};

/// A top-level comment with its approved replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Group comments into two-level threads. Input order is kept for both
/// levels; replies whose parent is absent are dropped.
pub fn build_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    let (top, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|c| c.parent_id.is_none());

    let mut by_parent: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for reply in replies {
        if let Some(parent) = reply.parent_id {
            by_parent.entry(parent).or_default().push(reply);
        }
    }

    top.into_iter()
        .map(|comment| CommentThread {
            replies: by_parent.remove(&comment.id).unwrap_or_default(),
            comment,
        })
        .collect()
}

fn validate_content(content: &str) -> Result<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation("comment cannot be empty".to_string()));
    }
    Ok(content)
}

/// Keep `comment_count` equal to the number of approved comments.
async fn sync_comment_count(post_id: Uuid, tx: &mut Transaction<'_, Postgres>) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE blog_posts SET comment_count = (
            SELECT COUNT(*) FROM blog_post_comments WHERE post_id = $1 AND is_approved
        )
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Add a comment or a reply. New comments wait for moderation.
pub async fn add(
    post_id: Uuid,
    actor: &Actor,
    content: &str,
    parent_id: Option<Uuid>,
    pool: &PgPool,
) -> Result<Comment> {
    let user_id = actor.require_user()?;
    let content = validate_content(content)?;
    BlogPost::find_published(post_id, pool).await?;

    if let Some(parent_id) = parent_id {
        let parent = Comment::find_by_id(parent_id, pool).await?;
        if parent.post_id != post_id {
            return Err(DomainError::Validation(
                "parent comment belongs to a different post".to_string(),
            ));
        }
        if parent.is_reply() {
            return Err(DomainError::Validation("cannot reply to a reply".to_string()));
        }
    }

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO blog_post_comments (post_id, user_id, parent_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(parent_id)
    .bind(content)
    .fetch_one(pool)
    .await?;

    info!(comment_id = %comment.id, %post_id, reply = parent_id.is_some(), "Comment added");
    Ok(comment)
}

/// Approve or reject a comment. Staff only.
pub async fn moderate(
    comment_id: Uuid,
    actor: &Actor,
    approve: bool,
    notes: &str,
    pool: &PgPool,
) -> Result<Comment> {
    actor.require_staff()?;
    let mut tx = pool.begin().await?;

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE blog_post_comments
        SET is_approved = $2, is_moderated = TRUE, moderated_at = NOW(),
            moderation_notes = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(comment_id)
    .bind(approve)
    .bind(notes.trim())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

    sync_comment_count(comment.post_id, &mut tx).await?;
    tx.commit().await?;

    info!(%comment_id, approve, "Comment moderated");
    Ok(comment)
}

/// Approved comments on a post as two-level threads, oldest first.
pub async fn thread(post_id: Uuid, pool: &PgPool) -> Result<Vec<CommentThread>> {
    let comments = Comment::approved_for_post(post_id, pool).await?;
    Ok(build_threads(comments))
}

/// Edit by the author or staff.
pub async fn edit(comment_id: Uuid, actor: &Actor, content: &str, pool: &PgPool) -> Result<Comment> {
    let content = validate_content(content)?;
    let comment = Comment::find_by_id(comment_id, pool).await?;
    ensure_can_modify(actor, &comment)?;

    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE blog_post_comments SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(comment_id)
    .bind(content)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Delete by the author or staff. Replies go with their parent.
pub async fn delete(comment_id: Uuid, actor: &Actor, pool: &PgPool) -> Result<()> {
    let comment = Comment::find_by_id(comment_id, pool).await?;
    ensure_can_modify(actor, &comment)?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM blog_post_comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;
    sync_comment_count(comment.post_id, &mut tx).await?;
    tx.commit().await?;
    Ok(())
}
