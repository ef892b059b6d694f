use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::{Category, ContentStatus, NewShowcase, Popularity, Rankable};
use uuid::Uuid;

use super::{bump_views, parse_status, write_status, SHOWCASE_ORDER};
use crate::error::{duplicate_on_conflict, DomainError, Result};
use crate::query_helpers::sql_limit;

#[derive(Debug, Clone, sqlx::FromRow)]
struct CaseStudyRow {
    id: Uuid,
    title: String,
    slug: String,
    summary: String,
    description: String,
    category: Option<String>,
    client_name: String,
    client_industry: String,
    technologies: Vec<String>,
    tools: Vec<String>,
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
pub struct CaseStudy {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub description: String,
    pub category: Category,
    pub client_name: String,
    pub client_industry: String,
    pub technologies: Vec<String>,
    pub tools: Vec<String>,
    pub status: ContentStatus,
    pub is_featured: bool,
    pub sort_order: i32,
    pub reading_time: i32,
    pub view_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CaseStudyRow {
    fn into_case_study(self) -> Result<CaseStudy> {
        Ok(CaseStudy {
            status: parse_status("case study", self.id, &self.status)?,
            category: self.category.as_deref().map(Category::legacy).unwrap_or(Category::Unset),
            id: self.id,
            title: self.title,
            slug: self.slug,
            summary: self.summary,
            description: self.description,
            client_name: self.client_name,
            client_industry: self.client_industry,
            technologies: self.technologies,
            tools: self.tools,
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

fn into_case_studies(rows: Vec<CaseStudyRow>) -> Result<Vec<CaseStudy>> {
    rows.into_iter().map(CaseStudyRow::into_case_study).collect()
}

impl CaseStudy {
    pub async fn create(new: &NewShowcase, pool: &PgPool) -> Result<Self> {
        let row = sqlx::query_as::<_, CaseStudyRow>(
            r#"
            INSERT INTO case_studies (
                title, slug, summary, description, category, client_name, client_industry,
                technologies, tools, is_featured, sort_order, reading_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(new.title())
        .bind(new.slug())
        .bind(new.summary())
        .bind(new.description())
        .bind(new.category())
        .bind(new.client())
        .bind(new.client_industry())
        .bind(new.technologies())
        .bind(new.tools())
        .bind(new.is_featured())
        .bind(new.sort_order())
        .bind(new.reading_time() as i32)
        .fetch_one(pool)
        .await
        .map_err(duplicate_on_conflict("a case study with this slug already exists"))?;

        tracing::info!(case_study_id = %row.id, slug = new.slug(), "Case study created");
        row.into_case_study()
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, CaseStudyRow>("SELECT * FROM case_studies WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("case study", id))?
            .into_case_study()
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, CaseStudyRow>("SELECT * FROM case_studies WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("case study", slug))?
            .into_case_study()
    }

    pub async fn list_published(limit: i64, offset: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "SELECT * FROM case_studies \
             WHERE status = 'published' AND published_at <= NOW() \
             ORDER BY {SHOWCASE_ORDER} LIMIT $1 OFFSET $2"
        ))
        .bind(limit.clamp(1, 100))
        .bind(offset.max(0))
        .fetch_all(pool)
        .await?;
        into_case_studies(rows)
    }

    /// Published case studies for one client industry.
    pub async fn by_industry(industry: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "SELECT * FROM case_studies \
             WHERE status = 'published' AND published_at <= NOW() AND lower(client_industry) = lower($1) \
             ORDER BY {SHOWCASE_ORDER}"
        ))
        .bind(industry.trim())
        .fetch_all(pool)
        .await?;
        into_case_studies(rows)
    }

    pub async fn set_status(id: Uuid, to: ContentStatus, pool: &PgPool) -> Result<Self> {
        let study = Self::find_by_id(id, pool).await?;
        let change = study.status.transition(to, study.published_at, Utc::now())?;
        write_status("case_studies", id, &change, pool).await?;

        tracing::info!(case_study_id = %id, from = %study.status, to = %change.status, "Case study status changed");
        Self::find_by_id(id, pool).await
    }

    pub async fn record_view(id: Uuid, pool: &PgPool) -> Result<i64> {
        bump_views("case_studies", "case study", id, pool).await
    }

    pub async fn ranking_pool(study: &CaseStudy, size: usize, pool: &PgPool) -> Result<Vec<Self>> {
        let technologies: Vec<String> = study.technologies.iter().map(|t| t.trim().to_lowercase()).collect();
        let rows = sqlx::query_as::<_, CaseStudyRow>(
            r#"
            SELECT * FROM case_studies
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
        .bind(study.id)
        .bind(study.category.key())
        .bind(&technologies)
        .bind(sql_limit(size))
        .fetch_all(pool)
        .await?;
        into_case_studies(rows)
    }
}

impl Rankable for CaseStudy {
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
