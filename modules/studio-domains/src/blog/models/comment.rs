use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::Ownable;
use uuid::Uuid;

use crate::error::{DomainError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_approved: bool,
    pub is_moderated: bool,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderation_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM blog_post_comments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", id))
    }

    /// Approved comments on a post, oldest first.
    pub async fn approved_for_post(post_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM blog_post_comments
            WHERE post_id = $1 AND is_approved
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Comments waiting for a moderator, oldest first.
    pub async fn pending_moderation(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM blog_post_comments
            WHERE NOT is_moderated
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl Ownable for Comment {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}
