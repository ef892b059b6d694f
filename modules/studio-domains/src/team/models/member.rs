use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use studio_common::content::clean_tags;
use studio_common::team::is_available_for_projects;
use studio_common::{Availability, ExperienceLevel, TeamRole, Workload};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, Result};

const TOP_SKILLS: usize = 3;

/// A team bio as entered by staff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTeamMember {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub experience_years: u32,
    pub skills: Vec<String>,
    /// Skill name to proficiency label, e.g. "Rust" => "Expert".
    pub skill_levels: BTreeMap<String, String>,
    pub certifications: Vec<String>,
    pub specializations: Vec<String>,
    pub email: String,
    pub phone: String,
    /// Network name to profile URL, e.g. "github" => "https://github.com/..".
    pub social_links: BTreeMap<String, String>,
    pub hourly_rate_cents: Option<u32>,
    pub sort_order: i32,
}

impl NewTeamMember {
    pub fn role(&self) -> Result<TeamRole> {
        TeamRole::from_str_loose(&self.role)
            .ok_or_else(|| DomainError::Validation(format!("unknown team role: {:?}", self.role)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("name is required".to_string()));
        }
        if self.bio.trim().is_empty() {
            return Err(DomainError::Validation("bio is required".to_string()));
        }
        if self.sort_order < 0 {
            return Err(DomainError::Validation("sort order cannot be negative".to_string()));
        }
        self.role()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub bio: String,
    pub experience_years: i32,
    pub skills: Vec<String>,
    pub skill_levels: Json<BTreeMap<String, String>>,
    pub certifications: Vec<String>,
    pub specializations: Vec<String>,
    pub current_projects: Vec<String>,
    pub availability: String,
    pub current_workload: i16,
    pub max_workload: i16,
    pub hourly_rate_cents: Option<i32>,
    pub email: String,
    pub phone: String,
    pub social_links: Json<BTreeMap<String, String>>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn team_role(&self) -> Option<TeamRole> {
        TeamRole::from_str_loose(&self.role)
    }

    pub fn availability(&self) -> Option<Availability> {
        Availability::from_str_loose(&self.availability)
    }

    pub fn workload(&self) -> Result<Workload> {
        Ok(Workload::new(self.current_workload as i64, self.max_workload as i64)?)
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        ExperienceLevel::from_years(self.experience_years.max(0) as u32)
    }

    pub fn top_skills(&self) -> &[String] {
        &self.skills[..self.skills.len().min(TOP_SKILLS)]
    }

    pub fn social_link(&self, network: &str) -> Option<&str> {
        self.social_links
            .get(&network.trim().to_lowercase())
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Active, marked available, and below their workload cap.
    pub fn is_available_for_projects(&self) -> bool {
        match (self.availability(), self.workload()) {
            (Some(availability), Ok(workload)) => {
                is_available_for_projects(self.is_active, availability, workload)
            }
            _ => false,
        }
    }

    pub async fn create(new: &NewTeamMember, pool: &PgPool) -> Result<Self> {
        new.validate()?;
        let role = new.role()?;
        let social_links: BTreeMap<String, String> = new
            .social_links
            .iter()
            .map(|(network, url)| (network.trim().to_lowercase(), url.trim().to_string()))
            .collect();
        let hourly_rate = new
            .hourly_rate_cents
            .map(i32::try_from)
            .transpose()
            .map_err(|_| DomainError::Validation("hourly rate is too large".to_string()))?;

        let member = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO team_members (
                name, role, bio, experience_years, skills, skill_levels, certifications,
                specializations, email, phone, social_links, hourly_rate_cents, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new.name.trim())
        .bind(role.as_str())
        .bind(new.bio.trim())
        .bind(i32::try_from(new.experience_years).unwrap_or(i32::MAX))
        .bind(clean_tags(&new.skills))
        .bind(Json(&new.skill_levels))
        .bind(clean_tags(&new.certifications))
        .bind(clean_tags(&new.specializations))
        .bind(new.email.trim())
        .bind(new.phone.trim())
        .bind(Json(&social_links))
        .bind(hourly_rate)
        .bind(new.sort_order)
        .fetch_one(pool)
        .await?;

        info!(member_id = %member.id, %role, "Team member added");
        Ok(member)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM team_members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DomainError::not_found("team member", id))
    }

    /// Active members in display order, optionally only one role.
    pub async fn list_active(role: Option<TeamRole>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM team_members
            WHERE is_active AND ($1::TEXT IS NULL OR role = $1)
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Members who can take on a new project, least loaded first.
    pub async fn available_for_projects(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM team_members
            WHERE is_active AND availability = 'available' AND current_workload < max_workload
            ORDER BY current_workload::FLOAT8 / NULLIF(max_workload, 0) ASC, sort_order ASC, name ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn set_availability(id: Uuid, availability: Availability, pool: &PgPool) -> Result<Self> {
        let member = sqlx::query_as::<_, Self>(
            "UPDATE team_members SET availability = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(availability.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("team member", id))?;

        info!(member_id = %id, %availability, "Team member availability changed");
        Ok(member)
    }

    pub async fn update_workload(id: Uuid, workload: Workload, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE team_members SET current_workload = $2, max_workload = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(workload.current() as i16)
        .bind(workload.max() as i16)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("team member", id))
    }

    /// Replace the member's current project list.
    pub async fn assign_projects(id: Uuid, projects: &[String], pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE team_members SET current_projects = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(clean_tags(projects))
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DomainError::not_found("team member", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            name: "Lin".to_string(),
            role: "developer".to_string(),
            bio: "Backend engineer".to_string(),
            experience_years: 6,
            skills: vec!["Rust".into(), "Postgres".into(), "Django".into(), "AWS".into()],
            skill_levels: Json(BTreeMap::new()),
            certifications: vec![],
            specializations: vec![],
            current_projects: vec![],
            availability: "available".to_string(),
            current_workload: 40,
            max_workload: 80,
            hourly_rate_cents: None,
            email: String::new(),
            phone: String::new(),
            social_links: Json(BTreeMap::from([
                ("github".to_string(), "https://github.com/lin".to_string()),
                ("twitter".to_string(), String::new()),
            ])),
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn derived_profile_fields() {
        let m = member();
        assert_eq!(m.team_role(), Some(TeamRole::Developer));
        assert_eq!(m.experience_level(), ExperienceLevel::MidLevel);
        assert_eq!(m.top_skills(), ["Rust", "Postgres", "Django"]);
        assert_eq!(m.workload().unwrap().utilization(), 50.0);
        assert_eq!(m.social_link("GitHub"), Some("https://github.com/lin"));
        assert_eq!(m.social_link("twitter"), None);
        assert_eq!(m.social_link("linkedin"), None);
    }

    #[test]
    fn availability_for_projects() {
        assert!(member().is_available_for_projects());

        let full = TeamMember {
            current_workload: 80,
            ..member()
        };
        assert!(!full.is_available_for_projects());

        let on_leave = TeamMember {
            availability: "on_leave".to_string(),
            ..member()
        };
        assert_eq!(on_leave.availability(), Some(Availability::OnLeave));
        assert!(!on_leave.is_available_for_projects());

        let inactive = TeamMember {
            is_active: false,
            ..member()
        };
        assert!(!inactive.is_available_for_projects());
    }

    #[test]
    fn new_member_needs_a_known_role() {
        let new = NewTeamMember {
            name: "Lin".into(),
            role: "Project Manager".into(),
            bio: "Keeps things moving".into(),
            ..Default::default()
        };
        assert_eq!(new.role().unwrap(), TeamRole::ProjectManager);
        assert!(new.validate().is_ok());

        let unknown = NewTeamMember {
            role: "wizard".into(),
            ..new
        };
        assert!(matches!(unknown.validate(), Err(DomainError::Validation(_))));
    }
}
