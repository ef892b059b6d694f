pub mod activities;
pub mod models;

pub use activities::analytics::{PlatformAnalytics, PostAnalytics};
pub use activities::comments::CommentThread;
pub use activities::engage::UserInteractions;
pub use activities::progress::ReadingAnalytics;
pub use models::{BlogCategory, BlogPost, Bookmark, Comment, Like, ReadingProgress, Share, View};
