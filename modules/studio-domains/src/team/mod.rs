//! Team bios with availability and workload for project staffing.

pub mod models;

pub use models::{NewTeamMember, TeamMember};
