#[macro_use]
mod choice;

pub mod category;
pub mod config;
pub mod content;
pub mod error;
pub mod file_config;
pub mod ownership;
pub mod ranking;
pub mod rating;
pub mod scoring;
pub mod team;
pub mod telemetry;
pub mod types;

pub use category::{Category, CategoryRef};
pub use config::{AppConfig, LogFormat};
pub use content::{ContentStatus, NewPost, NewShowcase, StatusChange};
pub use error::{StudioError, StudioResult};
pub use file_config::FileConfig;
pub use ownership::{ensure_can_modify, Actor, Ownable};
pub use ranking::{related, ContentItem, Popularity, Rankable, RankingConfig};
pub use rating::{RatingSummary, StarRating};
pub use scoring::{
    LeadForm, LeadScore, LeadScorer, LeadThresholds, MagnetForm, ScoreBreakdown, ScoringConfig,
};
pub use team::{ExperienceLevel, Workload};
pub use types::*;
