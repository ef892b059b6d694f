use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::{
    LeadMagnetKind, LeadScore, LeadScorer, LeadSource, LeadThresholds, MagnetForm, MagnetStatus,
};
use tracing::info;
use uuid::Uuid;

use super::{require_identity, trimmed};
use crate::error::{DomainError, Result};

/// A download request for a lead magnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnetSignup {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub lead_magnet_type: Option<String>,
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub subscribe_to_newsletter: bool,
}

impl Default for MagnetSignup {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            company: None,
            role: None,
            lead_magnet_type: None,
            source: None,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_term: None,
            utm_content: None,
            subscribe_to_newsletter: true,
        }
    }
}

impl MagnetSignup {
    pub fn kind(&self) -> Result<LeadMagnetKind> {
        match trimmed(&self.lead_magnet_type) {
            None => Ok(LeadMagnetKind::DjangoSaasChecklist),
            Some(raw) => LeadMagnetKind::from_str_loose(&raw)
                .ok_or_else(|| DomainError::Validation(format!("unknown lead magnet: {raw:?}"))),
        }
    }

    pub fn source(&self) -> Result<LeadSource> {
        match trimmed(&self.source) {
            None => Ok(LeadSource::Website),
            Some(raw) => LeadSource::from_str_loose(&raw)
                .ok_or_else(|| DomainError::Validation(format!("unknown lead source: {raw:?}"))),
        }
    }

    pub fn magnet_form(&self) -> MagnetForm {
        MagnetForm {
            company: self.company.clone(),
            role: self.role.clone(),
            utm_source: self.utm_source.clone(),
            utm_campaign: self.utm_campaign.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeadMagnetSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub lead_magnet_type: String,
    pub source: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub lead_score: i16,
    pub status: String,
    pub notes: String,
    pub is_subscribed_to_newsletter: bool,
    pub form_submitted_at: DateTime<Utc>,
    pub pdf_downloaded_at: Option<DateTime<Utc>>,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub email_opened_at: Option<DateTime<Utc>>,
    pub follow_up_scheduled: Option<DateTime<Utc>>,
    pub follow_up_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Statuses in which a magnet lead has shown enough interest to qualify.
const QUALIFYING_STATUSES: &[MagnetStatus] = &[
    MagnetStatus::Engaged,
    MagnetStatus::Qualified,
    MagnetStatus::Contacted,
    MagnetStatus::Converted,
];

impl LeadMagnetSubmission {
    pub fn score(&self) -> LeadScore {
        LeadScore::clamped(self.lead_score as i64)
    }

    pub fn magnet_status(&self) -> Result<MagnetStatus> {
        MagnetStatus::from_str_loose(&self.status).ok_or_else(|| {
            DomainError::Other(anyhow::anyhow!(
                "lead magnet submission {} has unknown status {:?}",
                self.id,
                self.status
            ))
        })
    }

    pub fn is_qualified(&self, thresholds: LeadThresholds) -> bool {
        MagnetStatus::from_str_loose(&self.status).is_some_and(|s| QUALIFYING_STATUSES.contains(&s))
            && self.score().value() >= thresholds.qualified
    }

    /// Store a download request, scored and promoted at intake.
    pub async fn create(signup: &MagnetSignup, scorer: &LeadScorer, pool: &PgPool) -> Result<Self> {
        require_identity(&signup.name, &signup.email)?;
        let kind = signup.kind()?;
        let source = signup.source()?;
        let score = scorer.score_magnet(&signup.magnet_form());
        let status = scorer.promote_magnet_status(MagnetStatus::New, score);

        let submission = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO lead_magnet_submissions (
                name, email, company, role, lead_magnet_type, source,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                lead_score, status, is_subscribed_to_newsletter
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(signup.name.trim())
        .bind(signup.email.trim().to_lowercase())
        .bind(trimmed(&signup.company))
        .bind(trimmed(&signup.role).map(|r| studio_common::normalize_choice(&r)))
        .bind(kind.as_str())
        .bind(source.as_str())
        .bind(trimmed(&signup.utm_source))
        .bind(trimmed(&signup.utm_medium))
        .bind(trimmed(&signup.utm_campaign))
        .bind(trimmed(&signup.utm_term))
        .bind(trimmed(&signup.utm_content))
        .bind(score.value() as i16)
        .bind(status.as_str())
        .bind(signup.subscribe_to_newsletter)
        .fetch_one(pool)
        .await?;

        info!(
            submission_id = %submission.id,
            lead_magnet = %kind,
            lead_score = score.value(),
            %status,
            "Lead magnet requested"
        );
        Ok(submission)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM lead_magnet_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("lead magnet submission", id))
    }

    /// Set a new score, clamped to 0..=100, and promote the status when the
    /// score crosses a threshold.
    pub async fn update_lead_score(id: Uuid, score: i64, scorer: &LeadScorer, pool: &PgPool) -> Result<Self> {
        let score = LeadScore::clamped(score);
        let mut tx = pool.begin().await?;

        let current =
            sqlx::query_as::<_, Self>("SELECT * FROM lead_magnet_submissions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DomainError::not_found("lead magnet submission", id))?;
        let status = scorer.promote_magnet_status(current.magnet_status()?, score);

        let updated = sqlx::query_as::<_, Self>(
            r#"
            UPDATE lead_magnet_submissions SET lead_score = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(score.value() as i16)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(submission_id = %id, lead_score = score.value(), %status, "Lead magnet score updated");
        Ok(updated)
    }

    /// Stamp the download. A `new` lead moves to `downloaded`.
    pub async fn mark_pdf_downloaded(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE lead_magnet_submissions
            SET pdf_downloaded_at = NOW(),
                status = CASE WHEN status = 'new' THEN 'downloaded' ELSE status END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("lead magnet submission", id))
    }

    pub async fn mark_email_sent(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE lead_magnet_submissions SET email_sent_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("lead magnet submission", id))
    }

    /// Stamp the email open. Leads that have not yet engaged move to `engaged`.
    pub async fn mark_email_opened(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE lead_magnet_submissions
            SET email_opened_at = NOW(),
                status = CASE WHEN status IN ('new', 'downloaded') THEN 'engaged' ELSE status END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("lead magnet submission", id))
    }

    /// Requests for one resource by one address, newest first.
    pub async fn find_by_email(email: &str, kind: LeadMagnetKind, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM lead_magnet_submissions
            WHERE email = $1 AND lead_magnet_type = $2
            ORDER BY form_submitted_at DESC
            "#,
        )
        .bind(email.trim().to_lowercase())
        .bind(kind.as_str())
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
