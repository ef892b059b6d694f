//! Client testimonials shown on the marketing site.

pub mod models;

pub use models::{NewTestimonial, Testimonial};
