use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::{Category, ContentStatus, NewShowcase, Popularity, Rankable};
use uuid::Uuid;

use super::{bump_views, parse_status, write_status, SHOWCASE_ORDER};
use crate::error::{duplicate_on_conflict, DomainError, Result};
use crate::query_helpers::sql_limit;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    long_description: String,
    category: Option<String>,
    client: String,
    technologies: Vec<String>,
    status: String,
    is_featured: bool,
    sort_order: i32,
    reading_time: i32,
    view_count: i64,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioProject {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub long_description: String,
    pub category: Category,
    pub client: String,
    pub technologies: Vec<String>,
    pub status: ContentStatus,
    pub is_featured: bool,
    pub sort_order: i32,
    pub reading_time: i32,
    pub view_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> Result<PortfolioProject> {
        Ok(PortfolioProject {
            status: parse_status("portfolio project", self.id, &self.status)?,
            category: self.category.as_deref().map(Category::legacy).unwrap_or(Category::Unset),
            id: self.id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            long_description: self.long_description,
            client: self.client,
            technologies: self.technologies,
            is_featured: self.is_featured,
            sort_order: self.sort_order,
            reading_time: self.reading_time,
            view_count: self.view_count,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_projects(rows: Vec<ProjectRow>) -> Result<Vec<PortfolioProject>> {
    rows.into_iter().map(ProjectRow::into_project).collect()
}

impl PortfolioProject {
    /// Insert a draft. The showcase summary becomes the card description and
    /// the full write-up the long description.
    pub async fn create(new: &NewShowcase, pool: &PgPool) -> Result<Self> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO portfolio_projects (
                title, slug, description, long_description, category, client,
                technologies, is_featured, sort_order, reading_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.title())
        .bind(new.slug())
        .bind(new.summary())
        .bind(new.description())
        .bind(new.category())
        .bind(new.client())
        .bind(new.technologies())
        .bind(new.is_featured())
        .bind(new.sort_order())
        .bind(new.reading_time() as i32)
        .fetch_one(pool)
        .await
        .map_err(duplicate_on_conflict("a project with this slug already exists"))?;

        tracing::info!(project_id = %row.id, slug = new.slug(), "Portfolio project created");
        row.into_project()
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, ProjectRow>("SELECT * FROM portfolio_projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("portfolio project", id))?
            .into_project()
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, ProjectRow>("SELECT * FROM portfolio_projects WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("portfolio project", slug))?
            .into_project()
    }

    pub async fn list_published(limit: i64, offset: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT * FROM portfolio_projects \
             WHERE status = 'published' AND published_at <= NOW() \
             ORDER BY {SHOWCASE_ORDER} LIMIT $1 OFFSET $2"
        ))
        .bind(limit.clamp(1, 100))
        .bind(offset.max(0))
        .fetch_all(pool)
        .await?;
        into_projects(rows)
    }

    pub async fn set_status(id: Uuid, to: ContentStatus, pool: &PgPool) -> Result<Self> {
        let project = Self::find_by_id(id, pool).await?;
        let change = project.status.transition(to, project.published_at, Utc::now())?;
        write_status("portfolio_projects", id, &change, pool).await?;

        tracing::info!(project_id = %id, from = %project.status, to = %change.status, "Project status changed");
        Self::find_by_id(id, pool).await
    }

    pub async fn record_view(id: Uuid, pool: &PgPool) -> Result<i64> {
        bump_views("portfolio_projects", "portfolio project", id, pool).await
    }

    /// Published candidates for ranking; same-category or shared-technology
    /// projects first.
    pub async fn ranking_pool(project: &PortfolioProject, size: usize, pool: &PgPool) -> Result<Vec<Self>> {
        let technologies: Vec<String> =
            project.technologies.iter().map(|t| t.trim().to_lowercase()).collect();
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT * FROM portfolio_projects
            WHERE status = 'published' AND published_at <= NOW() AND id <> $1
            ORDER BY
                COALESCE(
                    category = $2
                    OR EXISTS (SELECT 1 FROM unnest(technologies) t WHERE lower(trim(t)) = ANY($3)),
                    FALSE
                ) DESC,
                view_count DESC, published_at DESC
            LIMIT $4
            "#,
        )
        .bind(project.id)
        .bind(project.category.key())
        .bind(&technologies)
        .bind(sql_limit(size))
        .fetch_all(pool)
        .await?;
        into_projects(rows)
    }
}

impl Rankable for PortfolioProject {
    fn rank_id(&self) -> Uuid {
        self.id
    }
    fn category(&self) -> &Category {
        &self.category
    }
    fn tags(&self) -> &[String] {
        &self.technologies
    }
    fn popularity(&self) -> Popularity {
        Popularity {
            views: self.view_count,
            likes: 0,
        }
    }
    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
    fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }
}
