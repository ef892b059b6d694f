use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use studio_common::{
    BudgetTier, Industry, LeadForm, LeadScore, LeadScorer, LeadSource, LeadStatus, StudioError,
    Subject, TeamSize, Timeline, Urgency,
};
use tracing::info;
use uuid::Uuid;

use super::{canonical, require_identity, trimmed};
use crate::error::{DomainError, Result};

/// A contact form as submitted. Choice fields are free text until stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub project_budget: Option<String>,
    pub timeline: Option<String>,
    pub team_size: Option<String>,
    pub industry: Option<String>,
    pub urgency: Option<String>,
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
}

impl ContactForm {
    pub fn validate(&self) -> Result<()> {
        require_identity(&self.name, &self.email)?;
        if self.message.trim().is_empty() {
            return Err(DomainError::Validation("message is required".to_string()));
        }
        self.source()?;
        Ok(())
    }

    pub fn source(&self) -> Result<LeadSource> {
        match trimmed(&self.source) {
            None => Ok(LeadSource::Website),
            Some(raw) => LeadSource::from_str_loose(&raw)
                .ok_or_else(|| DomainError::Validation(format!("unknown lead source: {raw:?}"))),
        }
    }

    /// The fields the scorer reads.
    pub fn lead_form(&self) -> LeadForm {
        LeadForm {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            phone: self.phone.clone(),
            company: self.company.clone(),
            subject: self.subject.clone(),
            project_budget: self.project_budget.clone(),
            timeline: self.timeline.clone(),
            team_size: self.team_size.clone(),
            industry: self.industry.clone(),
            urgency: self.urgency.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub project_budget: Option<String>,
    pub timeline: Option<String>,
    pub team_size: Option<String>,
    pub industry: Option<String>,
    pub urgency: Option<String>,
    pub lead_score: i16,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub notes: String,
    pub source: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub first_contacted_at: Option<DateTime<Utc>>,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub follow_up_scheduled: Option<DateTime<Utc>>,
    pub follow_up_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn score(&self) -> LeadScore {
        LeadScore::clamped(self.lead_score as i64)
    }

    pub fn lead_status(&self) -> Result<LeadStatus> {
        LeadStatus::from_str_loose(&self.status).ok_or_else(|| {
            DomainError::Other(anyhow::anyhow!(
                "contact submission {} has unknown status {:?}",
                self.id,
                self.status
            ))
        })
    }

    /// A follow-up is due once its scheduled time has passed and it has not
    /// been completed since it was scheduled.
    pub fn is_follow_up_due(&self, now: DateTime<Utc>) -> bool {
        match (self.follow_up_scheduled, self.follow_up_completed) {
            (Some(scheduled), None) => scheduled <= now,
            (Some(scheduled), Some(completed)) => scheduled <= now && completed < scheduled,
            (None, _) => false,
        }
    }

    /// Store a submission scored once at intake. Status starts at `new`.
    pub async fn create(form: &ContactForm, scorer: &LeadScorer, pool: &PgPool) -> Result<Self> {
        form.validate()?;
        let score = scorer.score(&form.lead_form());

        let submission = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO contact_submissions (
                name, email, phone, company, subject, message,
                project_budget, timeline, team_size, industry, urgency,
                lead_score, status, source,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'new', $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(form.name.trim())
        .bind(form.email.trim().to_lowercase())
        .bind(trimmed(&form.phone))
        .bind(trimmed(&form.company))
        .bind(canonical(&form.subject, |s| Subject::from_str_loose(s).map(|v| v.as_str())))
        .bind(form.message.trim())
        .bind(canonical(&form.project_budget, |s| BudgetTier::from_str_loose(s).map(|v| v.as_str())))
        .bind(canonical(&form.timeline, |s| Timeline::from_str_loose(s).map(|v| v.as_str())))
        .bind(canonical(&form.team_size, |s| TeamSize::from_str_loose(s).map(|v| v.as_str())))
        .bind(canonical(&form.industry, |s| Industry::from_str_loose(s).map(|v| v.as_str())))
        .bind(canonical(&form.urgency, |s| Urgency::from_str_loose(s).map(|v| v.as_str())))
        .bind(score.value() as i16)
        .bind(form.source()?.as_str())
        .bind(trimmed(&form.utm_source))
        .bind(trimmed(&form.utm_medium))
        .bind(trimmed(&form.utm_campaign))
        .bind(trimmed(&form.utm_term))
        .bind(trimmed(&form.utm_content))
        .fetch_one(pool)
        .await?;

        info!(
            submission_id = %submission.id,
            lead_score = score.value(),
            high_priority = scorer.is_high_priority(score),
            "Contact submission received"
        );
        Ok(submission)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM contact_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("contact submission", id))
    }

    /// Replace the computed score with a manual one.
    pub async fn override_score(id: Uuid, score: LeadScore, pool: &PgPool) -> Result<Self> {
        let updated = sqlx::query_as::<_, Self>(
            r#"
            UPDATE contact_submissions SET lead_score = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(score.value() as i16)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("contact submission", id))?;

        info!(submission_id = %id, lead_score = score.value(), "Lead score overridden");
        Ok(updated)
    }

    /// Move along the sales pipeline. Backward moves and leaving a closed
    /// status are rejected.
    pub async fn update_status(id: Uuid, to: LeadStatus, pool: &PgPool) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_as::<_, Self>("SELECT * FROM contact_submissions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::not_found("contact submission", id))?;
        let from = current.lead_status()?;
        if !from.can_transition_to(to) {
            return Err(StudioError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into());
        }

        let updated = sqlx::query_as::<_, Self>(
            "UPDATE contact_submissions SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(to.as_str())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(submission_id = %id, %from, %to, "Lead status changed");
        Ok(updated)
    }

    pub async fn assign(id: Uuid, user_id: Option<Uuid>, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE contact_submissions SET assigned_to = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("contact submission", id))
    }

    pub async fn set_notes(id: Uuid, notes: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE contact_submissions SET notes = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(notes.trim())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("contact submission", id))
    }

    /// Record an outreach. The first contact time is kept; a `new` lead moves
    /// to `contacted`.
    pub async fn mark_contacted(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE contact_submissions
            SET first_contacted_at = COALESCE(first_contacted_at, NOW()),
                last_contacted_at = NOW(),
                status = CASE WHEN status = 'new' THEN 'contacted' ELSE status END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("contact submission", id))
    }

    pub async fn schedule_follow_up(id: Uuid, at: DateTime<Utc>, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE contact_submissions SET follow_up_scheduled = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("contact submission", id))
    }

    pub async fn complete_follow_up(id: Uuid, pool: &PgPool) -> Result<Self> {
        let submission = Self::find_by_id(id, pool).await?;
        if submission.follow_up_scheduled.is_none() {
            return Err(DomainError::Validation("no follow-up is scheduled".to_string()));
        }
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE contact_submissions SET follow_up_completed = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Follow-ups that are due at `now`, oldest schedule first.
    pub async fn needs_follow_up(now: DateTime<Utc>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM contact_submissions
            WHERE follow_up_scheduled <= $1
              AND (follow_up_completed IS NULL OR follow_up_completed < follow_up_scheduled)
            ORDER BY follow_up_scheduled ASC, lead_score DESC
            "#,
        )
        .bind(now)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Open leads at or above the high-priority threshold, best first.
    pub async fn high_priority(scorer: &LeadScorer, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM contact_submissions
            WHERE lead_score >= $1 AND status NOT IN ('won', 'lost')
            ORDER BY lead_score DESC, submitted_at DESC
            LIMIT $2
            "#,
        )
        .bind(scorer.thresholds().high_priority as i16)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
