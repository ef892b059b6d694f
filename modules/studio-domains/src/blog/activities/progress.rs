use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::blog::models::{BlogPost, ReadingProgress};
use crate::error::{DomainError, Result};

/// A post counts as read once this much of it has been seen.
pub const COMPLETION_THRESHOLD: i16 = 90;

/// A validated progress report from a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub percentage: i16,
    /// Seconds spent since the previous report; accumulates.
    pub time_spent: i32,
    pub last_position: i32,
}

impl ProgressUpdate {
    pub fn new(percentage: i64, time_spent: i64, last_position: i64) -> Result<Self> {
        if !(0..=100).contains(&percentage) {
            return Err(DomainError::Validation(
                "progress percentage must be between 0 and 100".to_string(),
            ));
        }
        if time_spent < 0 || last_position < 0 {
            return Err(DomainError::Validation(
                "time spent and position cannot be negative".to_string(),
            ));
        }
        Ok(Self {
            percentage: percentage as i16,
            time_spent: i32::try_from(time_spent)
                .map_err(|_| DomainError::Validation("time spent is too large".to_string()))?,
            last_position: i32::try_from(last_position)
                .map_err(|_| DomainError::Validation("position is too large".to_string()))?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.percentage >= COMPLETION_THRESHOLD
    }
}

/// Upsert a reader's progress on a post. Time spent accumulates and
/// `completed_at` is stamped the first time the post is completed.
pub async fn update(user_id: Uuid, post_id: Uuid, update: ProgressUpdate, pool: &PgPool) -> Result<ReadingProgress> {
    BlogPost::find_published(post_id, pool).await?;

    sqlx::query_as::<_, ReadingProgress>(
        r#"
        INSERT INTO reading_progress (
            user_id, post_id, progress_percentage, time_spent, last_position,
            is_completed, completed_at, last_read_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 THEN NOW() END, NOW())
        ON CONFLICT (user_id, post_id) DO UPDATE SET
            progress_percentage = EXCLUDED.progress_percentage,
            time_spent = reading_progress.time_spent + EXCLUDED.time_spent,
            last_position = EXCLUDED.last_position,
            is_completed = EXCLUDED.is_completed,
            completed_at = COALESCE(reading_progress.completed_at, EXCLUDED.completed_at),
            last_read_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .bind(update.percentage)
    .bind(update.time_spent)
    .bind(update.last_position)
    .bind(update.is_complete())
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingAnalytics {
    pub total_posts_read: i64,
    pub completed_posts: i64,
    /// Percentage of started posts that were completed.
    pub completion_rate: f64,
    pub total_time_spent: i64,
    pub average_progress: f64,
}

pub(crate) fn completion_rate(completed: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reading statistics for one user across all posts.
pub async fn user_analytics(user_id: Uuid, pool: &PgPool) -> Result<ReadingAnalytics> {
    let (total, completed, time_spent, average): (i64, i64, i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE is_completed),
            COALESCE(SUM(time_spent), 0)::BIGINT,
            AVG(progress_percentage)::FLOAT8
        FROM reading_progress
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(ReadingAnalytics {
        total_posts_read: total,
        completed_posts: completed,
        completion_rate: completion_rate(completed, total),
        total_time_spent: time_spent,
        average_progress: round2(average.unwrap_or(0.0)),
    })
}
