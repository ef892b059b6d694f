use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::content::slugify;
use studio_common::CategoryRef;
use uuid::Uuid;

use crate::error::{duplicate_on_conflict, DomainError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlogCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub description: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl BlogCategory {
    pub async fn create(name: &str, description: &str, color: Option<&str>, pool: &PgPool) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("category name is required".to_string()));
        }
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO blog_categories (name, slug, description, color)
            VALUES ($1, $2, $3, COALESCE($4, 'bg-blue-500'))
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slugify(name))
        .bind(description)
        .bind(color)
        .fetch_one(pool)
        .await
        .map_err(duplicate_on_conflict("a category with this slug already exists"))
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM blog_categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM blog_categories WHERE is_active ORDER BY sort_order ASC, name ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
        }
    }
}
