pub mod testimonial;

pub use testimonial::{NewTestimonial, Testimonial};
