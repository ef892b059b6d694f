use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudioError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for pure domain operations.
pub type StudioResult<T> = std::result::Result<T, StudioError>;
