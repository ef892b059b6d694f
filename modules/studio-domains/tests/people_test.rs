//! Integration tests for testimonials and team bios.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

mod harness;

use harness::{test_deps, unique};
use studio_common::{Availability, StarRating, TeamRole, Workload};
use studio_domains::team::{NewTeamMember, TeamMember};
use studio_domains::testimonials::{NewTestimonial, Testimonial};
use studio_domains::DomainError;

#[tokio::test]
async fn testimonials_follow_display_order() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let client = unique("Client");

    let add = |rating: i64, sort_order: i32| NewTestimonial {
        client: client.clone(),
        company: "Acme".to_string(),
        quote: "Shipped on time".to_string(),
        rating: StarRating::new(rating).unwrap(),
        sort_order,
    };
    let later = Testimonial::create(&add(5, 9_000), pool).await.unwrap();
    let good = Testimonial::create(&add(4, 8_000), pool).await.unwrap();
    let best = Testimonial::create(&add(5, 8_000), pool).await.unwrap();
    let low = Testimonial::create(&add(2, 8_000), pool).await.unwrap();
    assert_eq!(best.attribution(), format!("{client} from Acme"));

    let ours = |all: Vec<Testimonial>| -> Vec<_> {
        all.into_iter().filter(|t| t.client == client).map(|t| t.id).collect()
    };
    let listed = ours(Testimonial::list_active(None, pool).await.unwrap());
    assert_eq!(listed, vec![best.id, good.id, low.id, later.id]);

    let four_plus = ours(Testimonial::list_active(StarRating::new(4).ok(), pool).await.unwrap());
    assert_eq!(four_plus, vec![best.id, good.id, later.id]);

    Testimonial::set_active(best.id, false, pool).await.unwrap();
    let listed = ours(Testimonial::list_active(None, pool).await.unwrap());
    assert!(!listed.contains(&best.id));

    let err = Testimonial::create(
        &NewTestimonial {
            quote: " ".to_string(),
            ..add(5, 0)
        },
        pool,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn team_members_staffing_view() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();

    let new = |name: &str, role: &str| NewTeamMember {
        name: unique(name),
        role: role.to_string(),
        bio: "Builds things".to_string(),
        experience_years: 11,
        skills: vec!["Rust".into(), "Go".into()],
        social_links: [("LinkedIn".to_string(), " https://linkedin.com/in/x ".to_string())].into(),
        ..Default::default()
    };

    let dev = TeamMember::create(&new("Dev", "developer"), pool).await.unwrap();
    let pm = TeamMember::create(&new("Pm", "project_manager"), pool).await.unwrap();
    assert_eq!(pm.role, "pm");
    assert_eq!(dev.social_link("linkedin"), Some("https://linkedin.com/in/x"));
    assert_eq!(dev.experience_level().label(), "Senior");
    assert!(dev.is_available_for_projects());

    let developers = TeamMember::list_active(Some(TeamRole::Developer), pool).await.unwrap();
    assert!(developers.iter().any(|m| m.id == dev.id));
    assert!(!developers.iter().any(|m| m.id == pm.id));

    let busy = TeamMember::update_workload(pm.id, Workload::new(100, 100).unwrap(), pool)
        .await
        .unwrap();
    assert!(!busy.is_available_for_projects());
    TeamMember::set_availability(dev.id, Availability::OnLeave, pool).await.unwrap();

    let available = TeamMember::available_for_projects(pool).await.unwrap();
    assert!(!available.iter().any(|m| m.id == dev.id || m.id == pm.id));

    let staffed = TeamMember::assign_projects(dev.id, &["Ledger".to_string(), " ".to_string()], pool)
        .await
        .unwrap();
    assert_eq!(staffed.current_projects, vec!["Ledger".to_string()]);

    let err = TeamMember::create(&new("Wizard", "wizard"), pool).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}
