pub mod related;
