use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::{Ownable, StarRating};
use uuid::Uuid;

use crate::error::{DomainError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceRating {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceDownload {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: String,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceView {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: String,
    pub viewed_at: DateTime<Utc>,
}

impl ResourceRating {
    pub fn stars(&self) -> Result<StarRating> {
        StarRating::new(self.rating as i64).map_err(|_| {
            DomainError::Other(anyhow::anyhow!(
                "resource rating {} has out of range value {}",
                self.id,
                self.rating
            ))
        })
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM resource_ratings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("resource rating", id))
    }

    /// Ratings for one resource, newest first.
    pub async fn for_resource(resource_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM resource_ratings WHERE resource_id = $1 ORDER BY created_at DESC",
        )
        .bind(resource_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

impl ResourceDownload {
    pub async fn count_for_resource(resource_id: Uuid, pool: &PgPool) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM resource_downloads WHERE resource_id = $1",
        )
        .bind(resource_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}

impl ResourceView {
    pub async fn count_for_resource(resource_id: Uuid, pool: &PgPool) -> Result<i64> {
        let (count,) =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM resource_views WHERE resource_id = $1")
                .bind(resource_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}

impl Ownable for ResourceRating {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}
