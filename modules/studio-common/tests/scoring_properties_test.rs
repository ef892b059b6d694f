//! Properties of lead scoring that must hold for every accepted config.
//!
//! Pure functions, no infrastructure.
//!
//! Run with: cargo test -p studio-common --test scoring_properties_test

use studio_common::{
    BudgetTier, FileConfig, Industry, LeadForm, LeadScorer, Subject, TeamSize, Timeline, Urgency,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn some(v: &str) -> Option<String> {
    Some(v.to_string())
}

/// Every combination of one value per field, including absent.
fn forms() -> Vec<LeadForm> {
    let budgets: Vec<Option<String>> = std::iter::once(None)
        .chain(BudgetTier::ALL.iter().map(|b| some(b.as_str())))
        .collect();
    let timelines: Vec<Option<String>> = std::iter::once(None)
        .chain(Timeline::ALL.iter().map(|t| some(t.as_str())))
        .collect();
    let teams: Vec<Option<String>> = std::iter::once(None)
        .chain(TeamSize::ALL.iter().map(|t| some(t.as_str())))
        .collect();

    let mut out = Vec::new();
    for budget in &budgets {
        for timeline in &timelines {
            for team_size in &teams {
                for (i, industry) in Industry::ALL.iter().enumerate() {
                    out.push(LeadForm {
                        name: if i % 2 == 0 { some("Grace") } else { None },
                        email: some("grace@example.com"),
                        company: if i % 3 == 0 { some("Navy") } else { None },
                        subject: some(Subject::ALL[i % Subject::ALL.len()].as_str()),
                        urgency: some(Urgency::ALL[i % Urgency::ALL.len()].as_str()),
                        project_budget: budget.clone(),
                        timeline: timeline.clone(),
                        team_size: team_size.clone(),
                        industry: some(industry.as_str()),
                        ..Default::default()
                    });
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn score_is_always_within_bounds_and_deterministic() {
    let scorer = LeadScorer::default();
    for form in forms() {
        let first = scorer.score(&form);
        assert!(first.value() <= 100);
        assert_eq!(first, scorer.score(&form));
    }
}

#[test]
fn raising_budget_tier_never_lowers_the_score() {
    let scorer = LeadScorer::default();
    for base in forms() {
        let mut previous = None;
        for tier in BudgetTier::ORDERED {
            let form = LeadForm {
                project_budget: some(tier.as_str()),
                ..base.clone()
            };
            let score = scorer.score(&form);
            if let Some(prev) = previous {
                assert!(score >= prev, "{tier} lowered score for {form:?}");
            }
            previous = Some(score);
        }
    }
}

#[test]
fn raising_team_size_never_lowers_the_score() {
    let scorer = LeadScorer::default();
    let base = LeadForm {
        name: some("Grace"),
        ..Default::default()
    };
    let scores: Vec<u8> = TeamSize::ORDERED
        .iter()
        .map(|t| {
            scorer
                .score(&LeadForm {
                    team_size: some(t.as_str()),
                    ..base.clone()
                })
                .value()
        })
        .collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{scores:?}");
}

#[test]
fn sooner_timeline_never_lowers_the_score() {
    let scorer = LeadScorer::default();
    let scores: Vec<u8> = Timeline::ORDERED
        .iter()
        .map(|t| {
            scorer
                .score(&LeadForm {
                    timeline: some(t.as_str()),
                    ..Default::default()
                })
                .value()
        })
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
}

#[test]
fn maxed_submission_clamps_at_hundred() {
    let form = LeadForm {
        name: some("Ada"),
        email: some("ada@example.com"),
        phone: some("555-0100"),
        company: some("Engines Ltd"),
        subject: some("project"),
        project_budget: some("250k+"),
        timeline: some("asap"),
        team_size: some("50+"),
        industry: some("saas"),
        urgency: some("critical"),
    };
    assert_eq!(LeadScorer::default().score(&form).value(), 100);
}

#[test]
fn tuned_tables_from_toml_are_used() {
    let config = FileConfig::from_toml(
        r#"
        [scoring.presence]
        name = 1
        email = 1

        [scoring.subject]
        project = 20
        career = 15
        "#,
    )
    .unwrap();
    let scorer = LeadScorer::new(&config.scoring).unwrap();
    let form = LeadForm {
        name: some("Ada"),
        email: some("ada@example.com"),
        subject: some("Career"),
        ..Default::default()
    };
    assert_eq!(scorer.score(&form).value(), 17);
}

#[test]
fn non_monotone_timeline_is_rejected_at_load() {
    let result = FileConfig::from_toml(
        r#"
        [scoring.timeline]
        asap = 0
        "1-3-months" = 20
        "#,
    );
    assert!(result.is_err());
}
