//! Integration tests for contact submissions and lead magnets.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

mod harness;

use chrono::{Duration, Utc};
use harness::{test_deps, unique};
use studio_common::{LeadScore, LeadStatus, MagnetStatus};
use studio_domains::leads::{
    contact_analytics, ContactForm, ContactSubmission, LeadMagnetSubmission, MagnetSignup,
};
use studio_domains::DomainError;

fn contact_form() -> ContactForm {
    ContactForm {
        name: unique("Ada"),
        email: "ada@example.com".to_string(),
        company: Some("Analytical Engines".to_string()),
        subject: Some("Project Request".to_string()),
        message: "We need a platform built".to_string(),
        project_budget: Some("250k+".to_string()),
        timeline: Some("asap".to_string()),
        team_size: Some("50+".to_string()),
        industry: Some("fintech".to_string()),
        urgency: Some("urgent".to_string()),
        ..Default::default()
    }
}

// =========================================================================
// Contact submissions
// =========================================================================

#[tokio::test]
async fn contact_is_scored_once_at_intake() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let form = contact_form();
    let expected = deps.scorer().score(&form.lead_form());

    let submission = ContactSubmission::create(&form, deps.scorer(), deps.pool()).await.unwrap();
    assert_eq!(submission.score(), expected);
    assert_eq!(submission.lead_status().unwrap(), LeadStatus::New);
    assert_eq!(submission.source, "website");
    assert_eq!(submission.urgency.as_deref(), Some("critical"));
    assert!(deps.scorer().is_high_priority(submission.score()));
}

#[tokio::test]
async fn contact_requires_a_message() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let form = ContactForm {
        message: String::new(),
        ..contact_form()
    };
    let err = ContactSubmission::create(&form, deps.scorer(), deps.pool()).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn manual_override_outside_range_is_rejected() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let submission = ContactSubmission::create(&contact_form(), deps.scorer(), deps.pool())
        .await
        .unwrap();

    assert!(LeadScore::new(101).is_err());
    assert!(LeadScore::new(-1).is_err());

    let updated = ContactSubmission::override_score(submission.id, LeadScore::new(12).unwrap(), deps.pool())
        .await
        .unwrap();
    assert_eq!(updated.score().value(), 12);
}

#[tokio::test]
async fn pipeline_only_moves_forward() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let submission = ContactSubmission::create(&contact_form(), deps.scorer(), pool).await.unwrap();

    let contacted = ContactSubmission::mark_contacted(submission.id, pool).await.unwrap();
    assert_eq!(contacted.lead_status().unwrap(), LeadStatus::Contacted);
    let first = contacted.first_contacted_at.unwrap();

    let again = ContactSubmission::mark_contacted(submission.id, pool).await.unwrap();
    assert_eq!(again.first_contacted_at, Some(first));
    assert!(again.last_contacted_at.unwrap() >= first);

    ContactSubmission::update_status(submission.id, LeadStatus::Proposal, pool).await.unwrap();
    let err = ContactSubmission::update_status(submission.id, LeadStatus::Qualified, pool)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    ContactSubmission::update_status(submission.id, LeadStatus::Won, pool).await.unwrap();
    assert!(ContactSubmission::update_status(submission.id, LeadStatus::Lost, pool).await.is_err());
}

#[tokio::test]
async fn follow_ups_are_due_until_completed() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let submission = ContactSubmission::create(&contact_form(), deps.scorer(), pool).await.unwrap();
    let err = ContactSubmission::complete_follow_up(submission.id, pool).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    ContactSubmission::schedule_follow_up(submission.id, Utc::now() - Duration::hours(1), pool)
        .await
        .unwrap();
    let due = ContactSubmission::needs_follow_up(Utc::now(), pool).await.unwrap();
    assert!(due.iter().any(|s| s.id == submission.id));

    ContactSubmission::complete_follow_up(submission.id, pool).await.unwrap();
    let due = ContactSubmission::needs_follow_up(Utc::now(), pool).await.unwrap();
    assert!(!due.iter().any(|s| s.id == submission.id));
}

#[tokio::test]
async fn high_priority_excludes_closed_leads() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let open = ContactSubmission::create(&contact_form(), deps.scorer(), pool).await.unwrap();
    let closed = ContactSubmission::create(&contact_form(), deps.scorer(), pool).await.unwrap();
    ContactSubmission::update_status(closed.id, LeadStatus::Lost, pool).await.unwrap();

    let leads = ContactSubmission::high_priority(deps.scorer(), 1000, pool).await.unwrap();
    assert!(leads.iter().any(|s| s.id == open.id));
    assert!(!leads.iter().any(|s| s.id == closed.id));
    assert!(leads.windows(2).all(|w| w[0].lead_score >= w[1].lead_score));
}

#[tokio::test]
async fn analytics_count_the_window() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let since = Utc::now() - Duration::seconds(1);
    ContactSubmission::create(&contact_form(), deps.scorer(), pool).await.unwrap();
    let now = Utc::now() + Duration::seconds(1);

    let stats = contact_analytics(since, now, deps.scorer().thresholds(), pool).await.unwrap();
    assert!(stats.total_submissions >= 1);
    assert!(stats.high_priority_leads >= 1);
    assert!(stats.by_industry.get("fintech").copied().unwrap_or(0) >= 1);
    assert_eq!(stats.daily.len(), 7);
}

// =========================================================================
// Lead magnets
// =========================================================================

#[tokio::test]
async fn magnet_signup_scores_and_defaults() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let signup = MagnetSignup {
        name: unique("Grace"),
        email: "Grace@Example.com".to_string(),
        company: Some("Navy".to_string()),
        role: Some("Founder".to_string()),
        ..Default::default()
    };
    let submission = LeadMagnetSubmission::create(&signup, deps.scorer(), deps.pool()).await.unwrap();

    assert_eq!(submission.lead_magnet_type, "django-saas-checklist");
    assert_eq!(submission.email, "grace@example.com");
    assert_eq!(submission.lead_score, 30);
    assert_eq!(submission.magnet_status().unwrap(), MagnetStatus::New);
}

#[tokio::test]
async fn magnet_score_updates_promote_status() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let signup = MagnetSignup {
        name: unique("Lin"),
        email: "lin@example.com".to_string(),
        ..Default::default()
    };
    let submission = LeadMagnetSubmission::create(&signup, deps.scorer(), pool).await.unwrap();

    let downloaded = LeadMagnetSubmission::mark_pdf_downloaded(submission.id, pool).await.unwrap();
    assert_eq!(downloaded.magnet_status().unwrap(), MagnetStatus::Downloaded);
    assert!(downloaded.pdf_downloaded_at.is_some());

    let engaged = LeadMagnetSubmission::update_lead_score(submission.id, 60, deps.scorer(), pool)
        .await
        .unwrap();
    assert_eq!(engaged.magnet_status().unwrap(), MagnetStatus::Engaged);
    assert!(engaged.is_qualified(deps.scorer().thresholds()));

    let qualified = LeadMagnetSubmission::update_lead_score(submission.id, 250, deps.scorer(), pool)
        .await
        .unwrap();
    assert_eq!(qualified.lead_score, 100);
    assert_eq!(qualified.magnet_status().unwrap(), MagnetStatus::Qualified);

    let lowered = LeadMagnetSubmission::update_lead_score(submission.id, 10, deps.scorer(), pool)
        .await
        .unwrap();
    assert_eq!(lowered.magnet_status().unwrap(), MagnetStatus::Qualified);

    let mid = LeadMagnetSubmission::update_lead_score(submission.id, 60, deps.scorer(), pool)
        .await
        .unwrap();
    assert_eq!(mid.lead_score, 60);
    assert_eq!(mid.magnet_status().unwrap(), MagnetStatus::Qualified);
}

#[tokio::test]
async fn opening_the_email_engages_the_lead() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let signup = MagnetSignup {
        name: unique("Mae"),
        email: "mae@example.com".to_string(),
        lead_magnet_type: Some("startup_guide".to_string()),
        ..Default::default()
    };
    let submission = LeadMagnetSubmission::create(&signup, deps.scorer(), pool).await.unwrap();
    assert_eq!(submission.lead_magnet_type, "startup-guide");

    LeadMagnetSubmission::mark_email_sent(submission.id, pool).await.unwrap();
    let opened = LeadMagnetSubmission::mark_email_opened(submission.id, pool).await.unwrap();
    assert_eq!(opened.magnet_status().unwrap(), MagnetStatus::Engaged);
    assert!(opened.email_sent_at.is_some());
    assert!(opened.email_opened_at.is_some());
}
