//! Downloadable resources with download/view tracking and star ratings.

pub mod activities;
pub mod models;

pub use activities::rate::{change_rating, rate};
pub use activities::track::{record_download, record_view};
pub use models::{
    NewResource, Resource, ResourceCategory, ResourceDownload, ResourceRating, ResourceType,
    ResourceView,
};
