//! Star ratings on resources.
//!
//! One rating per (resource, user), enforced by the unique constraint on
//! `resource_ratings`. The resource keeps a running total and count, updated
//! in the same transaction as the rating row.

use sqlx::{PgPool, Postgres, Transaction};
use studio_common::{ensure_can_modify, Actor, RatingSummary, StarRating};
use tracing::{info, warn};
use uuid::Uuid;

use super::track::lock_listed_resource;
use crate::error::{duplicate_on_conflict, DomainError, Result};
use crate::resources::models::ResourceRating;

async fn write_summary(
    resource_id: Uuid,
    summary: RatingSummary,
    tx: &mut Transaction<'_, Postgres>,
) -> Result<()> {
    sqlx::query(
        "UPDATE resources SET rating_total = $2, rating_count = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(resource_id)
    .bind(summary.total)
    .bind(summary.count)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Rate a resource. A second rating by the same user is a `DuplicateAction`.
/// Returns the resource's new rating totals.
pub async fn rate(
    resource_id: Uuid,
    actor: &Actor,
    rating: StarRating,
    comment: &str,
    pool: &PgPool,
) -> Result<RatingSummary> {
    let user_id = actor.require_user()?;
    let mut tx = pool.begin().await?;
    let summary = lock_listed_resource(resource_id, &mut tx).await?;

    let inserted = sqlx::query(
        "INSERT INTO resource_ratings (resource_id, user_id, rating, comment) VALUES ($1, $2, $3, $4)",
    )
    .bind(resource_id)
    .bind(user_id)
    .bind(rating.value() as i16)
    .bind(comment.trim())
    .execute(&mut *tx)
    .await
    .map_err(duplicate_on_conflict("resource already rated"));

    if let Err(DomainError::DuplicateAction(msg)) = &inserted {
        warn!(%resource_id, %user_id, "Rejected duplicate action: {msg}");
    }
    inserted?;

    let summary = summary.with(rating);
    write_summary(resource_id, summary, &mut tx).await?;
    tx.commit().await?;

    info!(%resource_id, %user_id, rating = rating.value(), average = summary.average(), "Resource rated");
    Ok(summary)
}

/// Change an existing rating. Only its author or staff may do so.
pub async fn change_rating(
    rating_id: Uuid,
    actor: &Actor,
    rating: StarRating,
    comment: Option<&str>,
    pool: &PgPool,
) -> Result<RatingSummary> {
    let mut tx = pool.begin().await?;
    let existing = sqlx::query_as::<_, ResourceRating>(
        "SELECT * FROM resource_ratings WHERE id = $1 FOR UPDATE",
    )
    .bind(rating_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DomainError::not_found("resource rating", rating_id))?;
    ensure_can_modify(actor, &existing)?;

    let summary = lock_listed_resource(existing.resource_id, &mut tx).await?;
    sqlx::query(
        r#"
        UPDATE resource_ratings
        SET rating = $2, comment = COALESCE($3, comment), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(rating_id)
    .bind(rating.value() as i16)
    .bind(comment.map(str::trim))
    .execute(&mut *tx)
    .await?;

    let summary = summary.replace(existing.stars()?, rating);
    write_summary(existing.resource_id, summary, &mut tx).await?;
    tx.commit().await?;
    Ok(summary)
}
