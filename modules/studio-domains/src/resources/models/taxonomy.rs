use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::content::slugify;
use uuid::Uuid;

use crate::error::{duplicate_on_conflict, DomainError, Result};

fn required_name(name: &str, what: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation(format!("{what} name is required")));
    }
    Ok(name.to_string())
}

/// Topic grouping for resources, e.g. "Engineering" or "Fundraising".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub description: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ResourceCategory {
    pub async fn create(name: &str, description: &str, sort_order: i32, pool: &PgPool) -> Result<Self> {
        let name = required_name(name, "resource category")?;
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO resource_categories (name, slug, description, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(slugify(&name))
        .bind(description)
        .bind(sort_order)
        .fetch_one(pool)
        .await
        .map_err(duplicate_on_conflict("a resource category with this slug already exists"))
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM resource_categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("resource category", slug))
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM resource_categories WHERE is_active ORDER BY sort_order ASC, name ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

/// Format of a resource, e.g. "Checklist", "Guide" or "Template".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceType {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub color: String,
    pub description: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ResourceType {
    pub async fn create(name: &str, icon: Option<&str>, sort_order: i32, pool: &PgPool) -> Result<Self> {
        let name = required_name(name, "resource type")?;
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO resource_types (name, slug, icon, sort_order)
            VALUES ($1, $2, COALESCE($3, 'BookOpen'), $4)
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(slugify(&name))
        .bind(icon)
        .bind(sort_order)
        .fetch_one(pool)
        .await
        .map_err(duplicate_on_conflict("a resource type with this slug already exists"))
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM resource_types WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("resource type", slug))
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM resource_types WHERE is_active ORDER BY sort_order ASC, name ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
