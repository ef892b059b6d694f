//! Lead scoring.
//!
//! A contact form is scored by summing independent point tables, one per
//! field, and clamping the total. The tables are plain data so they can be
//! tuned from the `[scoring]` section of the studio config file.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::choice::Choice;
use crate::error::{StudioError, StudioResult};
use crate::types::{BudgetTier, Industry, MagnetStatus, Subject, TeamSize, Timeline, Urgency};

pub const MAX_LEAD_SCORE: u8 = 100;

// --- LeadScore ---

/// A lead score in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LeadScore(u8);

impl LeadScore {
    pub const ZERO: LeadScore = LeadScore(0);

    /// Validating constructor, used for manual overrides.
    pub fn new(value: i64) -> StudioResult<Self> {
        if (0..=MAX_LEAD_SCORE as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(StudioError::Validation(format!(
                "lead score must be between 0 and {MAX_LEAD_SCORE}, got {value}"
            )))
        }
    }

    /// Saturating constructor, used for computed scores.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, MAX_LEAD_SCORE as i64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for LeadScore {
    type Error = StudioError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        LeadScore::new(value)
    }
}

impl From<LeadScore> for i64 {
    fn from(score: LeadScore) -> Self {
        score.0 as i64
    }
}

impl std::fmt::Display for LeadScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Forms ---

/// The scoring-relevant fields of a contact form. Every field is optional and
/// blank strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub project_budget: Option<String>,
    pub timeline: Option<String>,
    pub team_size: Option<String>,
    pub industry: Option<String>,
    pub urgency: Option<String>,
}

/// The scoring-relevant fields of a lead magnet download form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnetForm {
    pub company: Option<String>,
    pub role: Option<String>,
    pub utm_source: Option<String>,
    pub utm_campaign: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// --- Configuration ---

fn table(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Lay `overrides` over `defaults` by choice, so a partial table only replaces
/// the entries it names. Spelling variants of the same choice replace each
/// other. Unknown keys are kept for `validate` to reject.
fn overlay<T: Choice>(
    defaults: BTreeMap<String, u32>,
    overrides: BTreeMap<String, u32>,
) -> BTreeMap<String, u32> {
    let replaced: HashSet<T> = overrides.keys().filter_map(|k| T::parse(k)).collect();
    let mut merged: BTreeMap<String, u32> = defaults
        .into_iter()
        .filter(|(key, _)| !matches!(T::parse(key), Some(c) if replaced.contains(&c)))
        .collect();
    merged.extend(overrides);
    merged
}

macro_rules! overlay_table {
    ($name:ident, $choice:ty, $defaults:ident) => {
        fn $name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, u32>, D::Error> {
            let overrides = BTreeMap::<String, u32>::deserialize(deserializer)?;
            Ok(overlay::<$choice>($defaults(), overrides))
        }
    };
}

fn default_budget() -> BTreeMap<String, u32> {
    table(&[
        ("under-10k", 5),
        ("10k-25k", 10),
        ("25k-50k", 15),
        ("50k-100k", 20),
        ("100k-250k", 25),
        ("250k+", 30),
        ("not-sure", 12),
    ])
}

fn default_timeline() -> BTreeMap<String, u32> {
    table(&[
        ("asap", 20),
        ("1-3-months", 15),
        ("3-6-months", 10),
        ("6-12-months", 5),
        ("12-plus-months", 0),
        ("flexible", 8),
    ])
}

fn default_team_size() -> BTreeMap<String, u32> {
    table(&[("solo", 5), ("2-10", 15), ("11-50", 25), ("50+", 35)])
}

fn default_industry() -> BTreeMap<String, u32> {
    table(&[
        ("saas", 25),
        ("fintech", 22),
        ("healthcare", 20),
        ("ecommerce", 18),
        ("manufacturing", 15),
        ("real-estate", 12),
        ("education", 12),
        ("consulting", 10),
        ("nonprofit", 8),
        ("other", 5),
    ])
}

fn default_urgency() -> BTreeMap<String, u32> {
    table(&[("low", 5), ("medium", 10), ("high", 20), ("critical", 25)])
}

fn default_subject() -> BTreeMap<String, u32> {
    table(&[
        ("project", 20),
        ("consultation", 18),
        ("quote", 18),
        ("partnership", 12),
        ("support", 8),
        ("other", 5),
        ("general", 0),
        ("career", 0),
    ])
}

overlay_table!(overlay_budget, BudgetTier, default_budget);
overlay_table!(overlay_timeline, Timeline, default_timeline);
overlay_table!(overlay_team_size, TeamSize, default_team_size);
overlay_table!(overlay_industry, Industry, default_industry);
overlay_table!(overlay_urgency, Urgency, default_urgency);
overlay_table!(overlay_subject, Subject, default_subject);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresencePoints {
    pub name: u32,
    pub email: u32,
    pub phone: u32,
    pub company: u32,
}

impl Default for PresencePoints {
    fn default() -> Self {
        Self {
            name: 5,
            email: 5,
            phone: 5,
            company: 5,
        }
    }
}

/// Point tables for contact-form scoring, keyed by choice value.
///
/// A table given in TOML is laid over the default table entry by entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub presence: PresencePoints,
    #[serde(deserialize_with = "overlay_budget")]
    pub budget: BTreeMap<String, u32>,
    #[serde(deserialize_with = "overlay_timeline")]
    pub timeline: BTreeMap<String, u32>,
    #[serde(deserialize_with = "overlay_team_size")]
    pub team_size: BTreeMap<String, u32>,
    #[serde(deserialize_with = "overlay_industry")]
    pub industry: BTreeMap<String, u32>,
    /// Points for an industry value that is present but not in the table.
    pub industry_fallback: u32,
    #[serde(deserialize_with = "overlay_urgency")]
    pub urgency: BTreeMap<String, u32>,
    #[serde(deserialize_with = "overlay_subject")]
    pub subject: BTreeMap<String, u32>,
    pub max_score: u32,
    pub magnet: MagnetScoringConfig,
    pub thresholds: LeadThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            presence: PresencePoints::default(),
            budget: default_budget(),
            timeline: default_timeline(),
            team_size: default_team_size(),
            industry: default_industry(),
            industry_fallback: 5,
            urgency: default_urgency(),
            subject: default_subject(),
            max_score: MAX_LEAD_SCORE as u32,
            magnet: MagnetScoringConfig::default(),
            thresholds: LeadThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Reject tables with unknown keys, a max score above 100, or ordered
    /// tables that break monotonicity.
    pub fn validate(&self) -> StudioResult<()> {
        if self.max_score == 0 || self.max_score > MAX_LEAD_SCORE as u32 {
            return Err(StudioError::Config(format!(
                "scoring.max_score must be in 1..={MAX_LEAD_SCORE}, got {}",
                self.max_score
            )));
        }

        let budget = compile::<BudgetTier>("budget", &self.budget)?;
        let timeline = compile::<Timeline>("timeline", &self.timeline)?;
        let team_size = compile::<TeamSize>("team_size", &self.team_size)?;
        compile::<Industry>("industry", &self.industry)?;
        compile::<Urgency>("urgency", &self.urgency)?;
        compile::<Subject>("subject", &self.subject)?;

        ensure_ordered("budget", BudgetTier::ORDERED, &budget, Direction::NonDecreasing)?;
        ensure_ordered("team_size", TeamSize::ORDERED, &team_size, Direction::NonDecreasing)?;
        ensure_ordered("timeline", Timeline::ORDERED, &timeline, Direction::NonIncreasing)?;

        self.thresholds.validate()
    }
}

/// Points for lead magnet downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnetScoringConfig {
    pub company: u32,
    pub decision_maker_roles: Vec<String>,
    pub decision_maker: u32,
    pub practitioner_roles: Vec<String>,
    pub practitioner: u32,
    pub utm_source: u32,
    pub utm_campaign: u32,
}

impl Default for MagnetScoringConfig {
    fn default() -> Self {
        Self {
            company: 10,
            decision_maker_roles: vec!["founder".into(), "ceo".into(), "cto".into()],
            decision_maker: 20,
            practitioner_roles: vec!["developer".into(), "product-manager".into()],
            practitioner: 15,
            utm_source: 5,
            utm_campaign: 5,
        }
    }
}

/// Score cut-offs used by lead pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadThresholds {
    pub qualified: u8,
    pub high_priority: u8,
}

impl Default for LeadThresholds {
    fn default() -> Self {
        Self {
            qualified: 50,
            high_priority: 75,
        }
    }
}

impl LeadThresholds {
    pub fn validate(&self) -> StudioResult<()> {
        if self.high_priority > MAX_LEAD_SCORE || self.qualified > self.high_priority {
            return Err(StudioError::Config(format!(
                "thresholds must satisfy qualified <= high_priority <= {MAX_LEAD_SCORE}, got {} / {}",
                self.qualified, self.high_priority
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Direction {
    NonDecreasing,
    NonIncreasing,
}

fn compile<T: Choice>(field: &str, raw: &BTreeMap<String, u32>) -> StudioResult<HashMap<T, u32>> {
    let mut out = HashMap::with_capacity(raw.len());
    for (key, points) in raw {
        let choice = T::parse(key).ok_or_else(|| {
            StudioError::Config(format!("scoring.{field}: unknown choice {key:?}"))
        })?;
        if out.insert(choice, *points).is_some() {
            return Err(StudioError::Config(format!(
                "scoring.{field}: {:?} is listed more than once",
                choice.wire()
            )));
        }
    }
    Ok(out)
}

/// Unknown keys are skipped; `validate` is the place that rejects them.
fn compile_lenient<T: Choice>(raw: &BTreeMap<String, u32>) -> HashMap<T, u32> {
    raw.iter()
        .filter_map(|(key, points)| T::parse(key).map(|c| (c, *points)))
        .collect()
}

fn ensure_ordered<T: Choice>(
    field: &str,
    order: &[T],
    points: &HashMap<T, u32>,
    direction: Direction,
) -> StudioResult<()> {
    let values: Vec<u32> = order.iter().map(|c| points.get(c).copied().unwrap_or(0)).collect();
    let ok = values.windows(2).all(|w| match direction {
        Direction::NonDecreasing => w[0] <= w[1],
        Direction::NonIncreasing => w[0] >= w[1],
    });
    if ok {
        Ok(())
    } else {
        let order: Vec<&str> = order.iter().map(Choice::wire).collect();
        Err(StudioError::Config(format!(
            "scoring.{field}: points {values:?} are not monotone over {order:?}"
        )))
    }
}

// --- Scorer ---

/// Per-field contributions of a contact form, before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub presence: u32,
    pub budget: u32,
    pub timeline: u32,
    pub team_size: u32,
    pub industry: u32,
    pub urgency: u32,
    pub subject: u32,
}

impl ScoreBreakdown {
    pub fn raw_total(&self) -> u32 {
        self.presence
            + self.budget
            + self.timeline
            + self.team_size
            + self.industry
            + self.urgency
            + self.subject
    }
}

/// Scores contact and lead magnet forms against compiled point tables.
#[derive(Debug, Clone)]
pub struct LeadScorer {
    presence: PresencePoints,
    budget: HashMap<BudgetTier, u32>,
    timeline: HashMap<Timeline, u32>,
    team_size: HashMap<TeamSize, u32>,
    industry: HashMap<Industry, u32>,
    industry_fallback: u32,
    urgency: HashMap<Urgency, u32>,
    subject: HashMap<Subject, u32>,
    max_score: u32,
    magnet: MagnetScoringConfig,
    thresholds: LeadThresholds,
}

impl Default for LeadScorer {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl LeadScorer {
    pub fn new(config: &ScoringConfig) -> StudioResult<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: &ScoringConfig) -> Self {
        Self {
            presence: config.presence.clone(),
            budget: compile_lenient(&config.budget),
            timeline: compile_lenient(&config.timeline),
            team_size: compile_lenient(&config.team_size),
            industry: compile_lenient(&config.industry),
            industry_fallback: config.industry_fallback,
            urgency: compile_lenient(&config.urgency),
            subject: compile_lenient(&config.subject),
            max_score: config.max_score.min(MAX_LEAD_SCORE as u32),
            magnet: config.magnet.clone(),
            thresholds: config.thresholds,
        }
    }

    pub fn thresholds(&self) -> LeadThresholds {
        self.thresholds
    }

    pub fn breakdown(&self, form: &LeadForm) -> ScoreBreakdown {
        let presence: u32 = [
            (&form.name, self.presence.name),
            (&form.email, self.presence.email),
            (&form.phone, self.presence.phone),
            (&form.company, self.presence.company),
        ]
        .into_iter()
        .filter(|(field, _)| present(field).is_some())
        .map(|(_, points)| points)
        .sum();

        let industry = match present(&form.industry) {
            None => 0,
            Some(raw) => Industry::from_str_loose(raw)
                .and_then(|i| self.industry.get(&i).copied())
                .unwrap_or(self.industry_fallback),
        };

        ScoreBreakdown {
            presence,
            budget: lookup(&self.budget, &form.project_budget),
            timeline: lookup(&self.timeline, &form.timeline),
            team_size: lookup(&self.team_size, &form.team_size),
            industry,
            urgency: lookup(&self.urgency, &form.urgency),
            subject: lookup(&self.subject, &form.subject),
        }
    }

    /// Score a contact form. Total and deterministic: absent or unknown
    /// values contribute nothing.
    pub fn score(&self, form: &LeadForm) -> LeadScore {
        let raw = self.breakdown(form).raw_total().min(self.max_score);
        LeadScore::clamped(raw as i64)
    }

    pub fn score_magnet(&self, form: &MagnetForm) -> LeadScore {
        let cfg = &self.magnet;
        let mut total = 0u32;
        if present(&form.company).is_some() {
            total += cfg.company;
        }
        if let Some(role) = present(&form.role).map(crate::choice::normalize_choice) {
            if cfg.decision_maker_roles.iter().any(|r| *r == role) {
                total += cfg.decision_maker;
            } else if cfg.practitioner_roles.iter().any(|r| *r == role) {
                total += cfg.practitioner;
            }
        }
        if present(&form.utm_source).is_some() {
            total += cfg.utm_source;
        }
        if present(&form.utm_campaign).is_some() {
            total += cfg.utm_campaign;
        }
        LeadScore::clamped(total.min(self.max_score) as i64)
    }

    /// Status after a magnet score update. Scores only ever promote: a lead
    /// already past the earned stage, or closed, keeps its status.
    pub fn promote_magnet_status(&self, current: MagnetStatus, score: LeadScore) -> MagnetStatus {
        let earned = if score.value() >= self.thresholds.high_priority {
            MagnetStatus::Qualified
        } else if score.value() >= self.thresholds.qualified {
            MagnetStatus::Engaged
        } else {
            return current;
        };
        current.advance_to(earned)
    }

    pub fn is_qualified(&self, score: LeadScore) -> bool {
        score.value() >= self.thresholds.qualified
    }

    pub fn is_high_priority(&self, score: LeadScore) -> bool {
        score.value() >= self.thresholds.high_priority
    }
}

fn lookup<T: Choice>(table: &HashMap<T, u32>, field: &Option<String>) -> u32 {
    present(field)
        .and_then(T::parse)
        .and_then(|choice| table.get(&choice).copied())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn full_form() -> LeadForm {
        LeadForm {
            name: s("Ada"),
            email: s("ada@example.com"),
            phone: s("+1 555 0100"),
            company: s("Analytical Engines"),
            subject: s("project"),
            project_budget: s("250k+"),
            timeline: s("asap"),
            team_size: s("50+"),
            industry: s("saas"),
            urgency: s("critical"),
        }
    }

    #[test]
    fn empty_form_scores_zero() {
        let scorer = LeadScorer::default();
        assert_eq!(scorer.score(&LeadForm::default()), LeadScore::ZERO);
    }

    #[test]
    fn name_and_email_score_ten() {
        let form = LeadForm {
            name: s("Ada"),
            email: s("ada@example.com"),
            ..Default::default()
        };
        assert_eq!(LeadScorer::default().score(&form).value(), 10);
    }

    #[test]
    fn everything_maxed_clamps_at_hundred() {
        let scorer = LeadScorer::default();
        let breakdown = scorer.breakdown(&full_form());
        assert!(breakdown.raw_total() > 100);
        assert_eq!(scorer.score(&full_form()).value(), 100);
    }

    #[test]
    fn blank_strings_are_absent() {
        let form = LeadForm {
            name: s("   "),
            company: s(""),
            industry: s(" "),
            ..Default::default()
        };
        assert_eq!(LeadScorer::default().score(&form).value(), 0);
    }

    #[test]
    fn unknown_values_contribute_nothing_except_industry_fallback() {
        let scorer = LeadScorer::default();
        let form = LeadForm {
            project_budget: s("a lot"),
            timeline: s("yesterday"),
            team_size: s("huge"),
            urgency: s("whenever"),
            subject: s("hello"),
            ..Default::default()
        };
        assert_eq!(scorer.score(&form).value(), 0);

        let form = LeadForm {
            industry: s("space mining"),
            ..Default::default()
        };
        assert_eq!(scorer.breakdown(&form).industry, 5);
    }

    #[test]
    fn choices_are_normalized() {
        let scorer = LeadScorer::default();
        let form = LeadForm {
            project_budget: s(" 50-100K "),
            timeline: s("1_3_months"),
            industry: s("E-Commerce"),
            ..Default::default()
        };
        let b = scorer.breakdown(&form);
        assert_eq!((b.budget, b.timeline, b.industry), (20, 15, 18));
    }

    #[test]
    fn default_config_is_valid() {
        ScoringConfig::default().validate().unwrap();
    }

    #[test]
    fn non_monotone_budget_is_rejected() {
        let mut config = ScoringConfig::default();
        config.budget.insert("250k+".into(), 1);
        let err = LeadScorer::new(&config).unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));
    }

    #[test]
    fn unknown_table_key_is_rejected() {
        let mut config = ScoringConfig::default();
        config.industry.insert("space-mining".into(), 25);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let overrides = table(&[("saas", 30)]);
        let merged = overlay::<Industry>(default_industry(), overrides);
        assert_eq!(merged.len(), 10);
        assert_eq!(merged["saas"], 30);
        assert_eq!(merged["fintech"], 22);
    }

    #[test]
    fn alias_override_replaces_the_canonical_entry() {
        let merged = overlay::<BudgetTier>(default_budget(), table(&[("250k-plus", 40)]));
        assert!(!merged.contains_key("250k+"));
        assert_eq!(merged["250k-plus"], 40);

        let config = ScoringConfig {
            budget: merged,
            ..Default::default()
        };
        let scorer = LeadScorer::new(&config).unwrap();
        let form = LeadForm {
            project_budget: s("250k+"),
            ..Default::default()
        };
        assert_eq!(scorer.breakdown(&form).budget, 40);
    }

    #[test]
    fn manual_override_range() {
        assert!(LeadScore::new(-1).is_err());
        assert!(LeadScore::new(101).is_err());
        assert_eq!(LeadScore::new(100).unwrap().value(), 100);
        assert_eq!(LeadScore::clamped(250).value(), 100);
        assert_eq!(LeadScore::clamped(-4).value(), 0);
    }

    #[test]
    fn lead_score_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<LeadScore>("101").is_err());
        assert_eq!(serde_json::from_str::<LeadScore>("42").unwrap().value(), 42);
    }

    #[test]
    fn magnet_scoring_and_promotion() {
        let scorer = LeadScorer::default();
        let form = MagnetForm {
            company: s("Acme"),
            role: s("CTO"),
            utm_source: s("newsletter"),
            utm_campaign: s("q3"),
        };
        let score = scorer.score_magnet(&form);
        assert_eq!(score.value(), 40);
        assert_eq!(
            scorer.promote_magnet_status(MagnetStatus::New, score),
            MagnetStatus::New
        );
        assert_eq!(
            scorer.promote_magnet_status(MagnetStatus::New, LeadScore::clamped(60)),
            MagnetStatus::Engaged
        );
        assert_eq!(
            scorer.promote_magnet_status(MagnetStatus::Downloaded, LeadScore::clamped(80)),
            MagnetStatus::Qualified
        );

        assert_eq!(
            scorer.promote_magnet_status(MagnetStatus::Qualified, LeadScore::clamped(60)),
            MagnetStatus::Qualified
        );
        assert_eq!(
            scorer.promote_magnet_status(MagnetStatus::Converted, LeadScore::clamped(80)),
            MagnetStatus::Converted
        );
        assert_eq!(
            scorer.promote_magnet_status(MagnetStatus::Lost, LeadScore::clamped(55)),
            MagnetStatus::Lost
        );
        assert_eq!(
            scorer.promote_magnet_status(MagnetStatus::Contacted, LeadScore::clamped(90)),
            MagnetStatus::Contacted
        );

        let dev = MagnetForm {
            role: s("Product Manager"),
            ..Default::default()
        };
        assert_eq!(scorer.score_magnet(&dev).value(), 15);
    }

    #[test]
    fn thresholds() {
        let scorer = LeadScorer::default();
        assert!(scorer.is_qualified(LeadScore::clamped(50)));
        assert!(!scorer.is_high_priority(LeadScore::clamped(74)));
        assert!(scorer.is_high_priority(LeadScore::clamped(75)));
    }
}
