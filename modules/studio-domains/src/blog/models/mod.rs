pub mod category;
pub mod comment;
pub mod engagement;
pub mod post;
pub mod reading_progress;

pub use category::BlogCategory;
pub use comment::Comment;
pub use engagement::{Bookmark, Like, Share, View};
pub use post::BlogPost;
pub use reading_progress::ReadingProgress;
