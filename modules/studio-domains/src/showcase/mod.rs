//! Portfolio projects and case studies: the published showcase of past work.

pub mod activities;
pub mod models;

pub use activities::related::{related_case_studies, related_projects};
pub use models::{CaseStudy, PortfolioProject};
