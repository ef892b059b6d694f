use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::StarRating;
use uuid::Uuid;

use crate::error::{DomainError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTestimonial {
    pub client: String,
    pub company: String,
    pub quote: String,
    pub rating: StarRating,
    pub sort_order: i32,
}

impl NewTestimonial {
    pub fn validate(&self) -> Result<()> {
        if self.client.trim().is_empty() {
            return Err(DomainError::Validation("client name is required".to_string()));
        }
        if self.quote.trim().is_empty() {
            return Err(DomainError::Validation("quote is required".to_string()));
        }
        if self.sort_order < 0 {
            return Err(DomainError::Validation("sort order cannot be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub client: String,
    pub company: String,
    pub quote: String,
    pub rating: i16,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Testimonial {
    pub fn stars(&self) -> Result<StarRating> {
        StarRating::new(self.rating as i64).map_err(|_| {
            DomainError::Other(anyhow::anyhow!(
                "testimonial {} has out of range rating {}",
                self.id,
                self.rating
            ))
        })
    }

    /// "Client from Company", or just the client when no company is given.
    pub fn attribution(&self) -> String {
        match self.company.trim() {
            "" => self.client.clone(),
            company => format!("{} from {company}", self.client),
        }
    }

    pub async fn create(new: &NewTestimonial, pool: &PgPool) -> Result<Self> {
        new.validate()?;
        let testimonial = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO testimonials (client, company, quote, rating, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.client.trim())
        .bind(new.company.trim())
        .bind(new.quote.trim())
        .bind(new.rating.value() as i16)
        .bind(new.sort_order)
        .fetch_one(pool)
        .await?;

        tracing::info!(testimonial_id = %testimonial.id, rating = new.rating.value(), "Testimonial added");
        Ok(testimonial)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM testimonials WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("testimonial", id))
    }

    /// Active testimonials in display order, best rated first within the same
    /// position. `min_rating` hides anything rated lower.
    pub async fn list_active(min_rating: Option<StarRating>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM testimonials
            WHERE is_active AND rating >= $1
            ORDER BY sort_order ASC, rating DESC, created_at DESC
            "#,
        )
        .bind(min_rating.map_or(1, |r| r.value() as i16))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn set_active(id: Uuid, active: bool, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE testimonials SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("testimonial", id))
    }
}
