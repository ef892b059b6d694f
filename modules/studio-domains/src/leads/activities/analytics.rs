use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::LeadThresholds;

use crate::deps::StudioDeps;
use crate::error::{DomainError, Result};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Bucket for submissions that left a breakdown field blank.
pub const UNSPECIFIED: &str = "unspecified";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactAnalytics {
    pub total_submissions: i64,
    pub new_leads: i64,
    pub qualified_leads: i64,
    pub high_priority_leads: i64,
    pub needs_follow_up: i64,
    pub average_score: f64,
    pub by_status: BTreeMap<String, i64>,
    pub by_subject: BTreeMap<String, i64>,
    pub by_industry: BTreeMap<String, i64>,
    /// One entry per day for the seven days ending at `now`, oldest first.
    pub daily: Vec<DailyCount>,
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

async fn breakdown(
    column: &str,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
    pool: &PgPool,
) -> Result<BTreeMap<String, i64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
        r#"
        SELECT COALESCE(NULLIF({column}, ''), '{UNSPECIFIED}'), COUNT(*)
        FROM contact_submissions
        WHERE submitted_at >= $1 AND submitted_at <= $2
        GROUP BY 1
        "#
    ))
    .bind(since)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Contact pipeline numbers for submissions received in `[since, now]`.
pub async fn contact_analytics(
    since: DateTime<Utc>,
    now: DateTime<Utc>,
    thresholds: LeadThresholds,
    pool: &PgPool,
) -> Result<ContactAnalytics> {
    let (total, new_leads, qualified, high_priority, follow_up, average): (
        i64,
        i64,
        i64,
        i64,
        i64,
        Option<f64>,
    ) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status = 'new'),
            COUNT(*) FILTER (WHERE lead_score >= $3),
            COUNT(*) FILTER (WHERE lead_score >= $4),
            COUNT(*) FILTER (
                WHERE follow_up_scheduled <= $2
                  AND (follow_up_completed IS NULL OR follow_up_completed < follow_up_scheduled)
            ),
            AVG(lead_score)::FLOAT8
        FROM contact_submissions
        WHERE submitted_at >= $1 AND submitted_at <= $2
        "#,
    )
    .bind(since)
    .bind(now)
    .bind(thresholds.qualified as i16)
    .bind(thresholds.high_priority as i16)
    .fetch_one(pool)
    .await?;

    let daily = sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT d.day, COUNT(c.id) AS count
        FROM (
            SELECT generate_series(($1::timestamptz)::date - 6, ($1::timestamptz)::date, INTERVAL '1 day')::date AS day
        ) d
        LEFT JOIN contact_submissions c ON c.submitted_at::date = d.day
        GROUP BY d.day
        ORDER BY d.day
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(ContactAnalytics {
        total_submissions: total,
        new_leads,
        qualified_leads: qualified,
        high_priority_leads: high_priority,
        needs_follow_up: follow_up,
        average_score: round1(average.unwrap_or(0.0)),
        by_status: breakdown("status", since, now, pool).await?,
        by_subject: breakdown("subject", since, now, pool).await?,
        by_industry: breakdown("industry", since, now, pool).await?,
        daily,
    })
}

/// Start of a window of `days` days ending at `now`.
pub(crate) fn window_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    if days <= 0 {
        return Err(DomainError::Validation("analytics window must be at least one day".to_string()));
    }
    TimeDelta::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| DomainError::Validation(format!("analytics window of {days} days is out of range")))
}

/// Analytics for the last `days` days, using the configured thresholds.
pub async fn recent_contact_analytics(days: Option<i64>, deps: &StudioDeps) -> Result<ContactAnalytics> {
    let now = Utc::now();
    let since = window_start(now, days.unwrap_or(DEFAULT_WINDOW_DAYS))?;
    contact_analytics(since, now, deps.scorer().thresholds(), deps.pool()).await
}
