pub mod engagement;
pub mod resource;
pub mod taxonomy;

pub use engagement::{ResourceDownload, ResourceRating, ResourceView};
pub use resource::{NewResource, Resource};
pub use taxonomy::{ResourceCategory, ResourceType};
