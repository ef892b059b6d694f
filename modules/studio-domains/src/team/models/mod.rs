pub mod member;

pub use member::{NewTeamMember, TeamMember};
