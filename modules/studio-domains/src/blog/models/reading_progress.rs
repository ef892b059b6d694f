use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::Ownable;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub progress_percentage: i16,
    pub time_spent: i32,
    pub last_position: i32,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_read_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ReadingProgress {
    pub async fn find(user_id: Uuid, post_id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM reading_progress WHERE user_id = $1 AND post_id = $2",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// A user's most recently read posts.
    pub async fn recent_for_user(user_id: Uuid, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM reading_progress
            WHERE user_id = $1
            ORDER BY last_read_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

impl Ownable for ReadingProgress {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}
