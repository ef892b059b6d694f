pub mod analytics;
pub mod comments;
pub mod engage;
pub mod progress;
pub mod related;
