use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::content::{clean_tags, slugify};
use studio_common::RatingSummary;
use uuid::Uuid;

use crate::error::{duplicate_on_conflict, DomainError, Result};
use crate::query_helpers::{append_pagination, append_resource_filters, ResourceFilters};

/// A downloadable guide, checklist or template as entered by staff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewResource {
    pub title: String,
    pub description: String,
    pub long_description: String,
    pub type_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub file_size: String,
    pub format: String,
    pub estimated_time: String,
    pub external_url: String,
    pub author: Option<String>,
    pub is_featured: bool,
    pub is_premium: bool,
    pub sort_order: i32,
    /// Defaults to now; a future date schedules the resource.
    pub published_at: Option<DateTime<Utc>>,
}

impl NewResource {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("resource title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::Validation("resource description is required".to_string()));
        }
        Ok(())
    }

    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub long_description: String,
    pub type_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub file_size: String,
    pub format: String,
    pub estimated_time: String,
    pub external_url: String,
    pub author: String,
    pub is_featured: bool,
    pub is_premium: bool,
    pub sort_order: i32,
    pub is_active: bool,
    pub download_count: i64,
    pub view_count: i64,
    pub rating_total: i64,
    pub rating_count: i64,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn rating(&self) -> RatingSummary {
        RatingSummary {
            total: self.rating_total,
            count: self.rating_count,
        }
    }

    pub fn is_listed(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.published_at <= now
    }

    pub async fn create(new: &NewResource, pool: &PgPool) -> Result<Self> {
        new.validate()?;
        let slug = new.slug();
        let resource = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO resources (
                title, slug, description, long_description, type_id, category_id, tags,
                file_size, format, estimated_time, external_url, author,
                is_featured, is_premium, sort_order, published_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                COALESCE($12, 'Studio Team'), $13, $14, $15, COALESCE($16, NOW())
            )
            RETURNING *
            "#,
        )
        .bind(new.title.trim())
        .bind(&slug)
        .bind(new.description.trim())
        .bind(new.long_description.trim())
        .bind(new.type_id)
        .bind(new.category_id)
        .bind(clean_tags(&new.tags))
        .bind(new.file_size.trim())
        .bind(new.format.trim())
        .bind(new.estimated_time.trim())
        .bind(new.external_url.trim())
        .bind(new.author.as_deref().map(str::trim).filter(|a| !a.is_empty()))
        .bind(new.is_featured)
        .bind(new.is_premium)
        .bind(new.sort_order)
        .bind(new.published_at)
        .fetch_one(pool)
        .await
        .map_err(duplicate_on_conflict("a resource with this slug already exists"))?;

        tracing::info!(resource_id = %resource.id, slug = %slug, "Resource created");
        Ok(resource)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("resource", id))
    }

    /// An active, published resource by slug.
    pub async fn find_listed(slug: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM resources WHERE slug = $1 AND is_active AND published_at <= NOW()",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("resource", slug))
    }

    /// Active, published resources matching `filters`: featured first, then
    /// manual order, then newest.
    pub async fn list(filters: &ResourceFilters, pool: &PgPool) -> Result<Vec<Self>> {
        let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            r#"
            SELECT r.* FROM resources r
            JOIN resource_types t ON t.id = r.type_id
            JOIN resource_categories c ON c.id = r.category_id
            WHERE r.is_active AND r.published_at <= NOW()
            "#,
        );
        append_resource_filters(&mut qb, filters, "r", "t", "c");
        qb.push(" ORDER BY r.is_featured DESC, r.sort_order ASC, r.published_at DESC, r.id ");
        append_pagination(&mut qb, filters.limit, filters.offset);

        qb.build_query_as::<Self>()
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Most downloaded active resources.
    pub async fn popular(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM resources
            WHERE is_active AND published_at <= NOW()
            ORDER BY download_count DESC, view_count DESC, published_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(1, 100))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn set_active(id: Uuid, active: bool, pool: &PgPool) -> Result<Self> {
        let resource = sqlx::query_as::<_, Self>(
            "UPDATE resources SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("resource", id))?;

        tracing::info!(resource_id = %id, active, "Resource visibility changed");
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_resource_requires_title_and_description() {
        let new = NewResource {
            title: "Django SaaS Checklist".into(),
            description: "Forty things to check before launch".into(),
            ..Default::default()
        };
        assert!(new.validate().is_ok());
        assert_eq!(new.slug(), "django-saas-checklist");

        let untitled = NewResource {
            title: "  ".into(),
            ..new.clone()
        };
        assert!(matches!(untitled.validate(), Err(DomainError::Validation(_))));

        let bare = NewResource {
            description: String::new(),
            ..new
        };
        assert!(bare.validate().is_err());
    }
}
