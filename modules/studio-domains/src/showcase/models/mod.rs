pub mod case_study;
pub mod portfolio;

pub use case_study::CaseStudy;
pub use portfolio::PortfolioProject;

use sqlx::PgPool;
use studio_common::{ContentStatus, StatusChange};
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Published first by featured flag, then manual order, then newest.
pub(crate) const SHOWCASE_ORDER: &str = "is_featured DESC, sort_order ASC, published_at DESC, id";

pub(crate) fn parse_status(what: &str, id: Uuid, raw: &str) -> Result<ContentStatus> {
    ContentStatus::from_str_loose(raw)
        .ok_or_else(|| DomainError::Other(anyhow::anyhow!("{what} {id} has unknown status {raw:?}")))
}

pub(crate) async fn write_status(table: &str, id: Uuid, change: &StatusChange, pool: &PgPool) -> Result<()> {
    sqlx::query(&format!(
        "UPDATE {table} SET status = $2, published_at = $3, updated_at = NOW() WHERE id = $1"
    ))
    .bind(id)
    .bind(change.status.as_str())
    .bind(change.published_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Bump `view_count` on a published showcase row. Returns the new count.
pub(crate) async fn bump_views(table: &str, what: &str, id: Uuid, pool: &PgPool) -> Result<i64> {
    sqlx::query_as::<_, (i64,)>(&format!(
        "UPDATE {table} SET view_count = view_count + 1 \
         WHERE id = $1 AND status = 'published' AND published_at <= NOW() \
         RETURNING view_count"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|(count,)| count)
    .ok_or_else(|| DomainError::not_found(what, id))
}
