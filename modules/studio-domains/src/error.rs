use studio_common::StudioError;

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The action was already performed, e.g. liking a post twice.
    #[error("Duplicate action: {0}")]
    DuplicateAction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Studio(#[from] StudioError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DomainError {
    /// HTTP status an outer layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::NotFound(_) => 404,
            DomainError::DuplicateAction(_) => 409,
            DomainError::Validation(_) => 400,
            DomainError::Permission(_) => 403,
            DomainError::Studio(StudioError::Permission(_)) => 403,
            DomainError::Studio(
                StudioError::Validation(_) | StudioError::InvalidTransition { .. },
            ) => 400,
            DomainError::Studio(StudioError::Config(_))
            | DomainError::Database(_)
            | DomainError::Other(_) => 500,
        }
    }

    pub fn not_found(what: &str, key: impl std::fmt::Display) -> Self {
        DomainError::NotFound(format!("{what} {key}"))
    }
}

/// Map a unique-constraint violation to `DuplicateAction`, pass anything else through.
pub(crate) fn duplicate_on_conflict(message: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DomainError::DuplicateAction(message.to_string())
        }
        _ => DomainError::Database(err),
    }
}
