//! Resource downloads and views.
//!
//! Each one writes its log row and bumps the resource counter in one
//! transaction.

use sqlx::{PgPool, Postgres, Transaction};
use studio_common::{Actor, RatingSummary};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Download,
    View,
}

impl Visit {
    fn table(self) -> &'static str {
        match self {
            Visit::Download => "resource_downloads",
            Visit::View => "resource_views",
        }
    }

    fn counter(self) -> &'static str {
        match self {
            Visit::Download => "download_count",
            Visit::View => "view_count",
        }
    }
}

/// Fail with `NotFound` unless the resource is active and published. Locks
/// the row and returns its current rating totals.
pub(crate) async fn lock_listed_resource(
    resource_id: Uuid,
    tx: &mut Transaction<'_, Postgres>,
) -> Result<RatingSummary> {
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT rating_total, rating_count FROM resources
        WHERE id = $1 AND is_active AND published_at <= NOW()
        FOR UPDATE
        "#,
    )
    .bind(resource_id)
    .fetch_optional(&mut **tx)
    .await?
    .map(|(total, count)| RatingSummary { total, count })
    .ok_or_else(|| DomainError::not_found("resource", resource_id))
}

async fn record(
    visit: Visit,
    resource_id: Uuid,
    actor: &Actor,
    user_agent: &str,
    referrer: &str,
    pool: &PgPool,
) -> Result<i64> {
    let (user_id, ip) = match actor {
        Actor::Anonymous { ip, .. } => (None, ip.as_deref()),
        other => (other.user_id(), None),
    };

    let mut tx = pool.begin().await?;
    lock_listed_resource(resource_id, &mut tx).await?;

    sqlx::query(&format!(
        "INSERT INTO {} (resource_id, user_id, ip_address, user_agent, referrer) VALUES ($1, $2, $3, $4, $5)",
        visit.table()
    ))
    .bind(resource_id)
    .bind(user_id)
    .bind(ip)
    .bind(user_agent)
    .bind(referrer)
    .execute(&mut *tx)
    .await?;

    let (count,) = sqlx::query_as::<_, (i64,)>(&format!(
        "UPDATE resources SET {counter} = {counter} + 1 WHERE id = $1 RETURNING {counter}",
        counter = visit.counter()
    ))
    .bind(resource_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(count)
}

/// Log a download. Anonymous downloads are allowed. Returns the new download count.
pub async fn record_download(
    resource_id: Uuid,
    actor: &Actor,
    user_agent: &str,
    referrer: &str,
    pool: &PgPool,
) -> Result<i64> {
    let count = record(Visit::Download, resource_id, actor, user_agent, referrer, pool).await?;
    info!(%resource_id, count, "Resource downloaded");
    Ok(count)
}

/// Log a view. Returns the new view count.
pub async fn record_view(
    resource_id: Uuid,
    actor: &Actor,
    user_agent: &str,
    referrer: &str,
    pool: &PgPool,
) -> Result<i64> {
    record(Visit::View, resource_id, actor, user_agent, referrer, pool).await
}
