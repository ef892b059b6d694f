use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::Ownable;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bookmark {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub bookmarked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Share {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub session_key: Option<String>,
    pub platform: String,
    pub shared_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct View {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub session_key: Option<String>,
    pub user_agent: String,
    pub referrer: String,
    pub viewed_at: DateTime<Utc>,
}

impl Like {
    pub async fn find_for_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM blog_post_likes WHERE user_id = $1 ORDER BY liked_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

impl Bookmark {
    pub async fn find_for_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM blog_post_bookmarks WHERE user_id = $1 ORDER BY bookmarked_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

impl View {
    pub async fn count_for_post(post_id: Uuid, pool: &PgPool) -> Result<i64> {
        let (count,) =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM blog_post_views WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}

impl Ownable for Like {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

impl Ownable for Bookmark {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}
