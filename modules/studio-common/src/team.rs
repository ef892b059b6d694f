//! Staffing helpers for team bios.

use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};
use crate::types::Availability;

/// Seniority band derived from years of experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceLevel {
    Entry,
    Junior,
    MidLevel,
    Senior,
}

impl ExperienceLevel {
    pub fn from_years(years: u32) -> Self {
        match years {
            10.. => ExperienceLevel::Senior,
            5..=9 => ExperienceLevel::MidLevel,
            2..=4 => ExperienceLevel::Junior,
            _ => ExperienceLevel::Entry,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry-level",
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
        }
    }
}

/// Current load against capacity, both as percentages in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    current: u8,
    max: u8,
}

impl Workload {
    pub fn new(current: i64, max: i64) -> StudioResult<Self> {
        let in_range = |v: i64| (0..=100).contains(&v);
        if !in_range(current) || !in_range(max) {
            return Err(StudioError::Validation(format!(
                "workload must be between 0 and 100, got {current} of {max}"
            )));
        }
        Ok(Self {
            current: current as u8,
            max: max as u8,
        })
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// Share of capacity in use, 0.0 when the capacity is zero.
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f64 / self.max as f64 * 100.0
    }

    pub fn has_capacity(&self) -> bool {
        self.current < self.max
    }
}

impl Default for Workload {
    fn default() -> Self {
        Self { current: 0, max: 100 }
    }
}

/// Whether someone can be put on a new project.
pub fn is_available_for_projects(active: bool, availability: Availability, workload: Workload) -> bool {
    active && availability == Availability::Available && workload.has_capacity()
}
