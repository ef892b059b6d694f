pub mod activities;
pub mod models;

pub use activities::analytics::{
    contact_analytics, recent_contact_analytics, ContactAnalytics, DailyCount,
};
pub use models::{ContactForm, ContactSubmission, LeadMagnetSubmission, MagnetSignup};
