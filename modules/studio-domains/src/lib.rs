pub mod blog;
pub mod deps;
pub mod error;
pub mod leads;
pub mod query_helpers;
pub mod resources;
pub mod showcase;
pub mod team;
pub mod testimonials;

pub use deps::StudioDeps;
pub use error::{DomainError, Result};
