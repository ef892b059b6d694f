pub mod contact;
pub mod magnet;

pub use contact::{ContactForm, ContactSubmission};
pub use magnet::{LeadMagnetSubmission, MagnetSignup};

use crate::error::{DomainError, Result};

pub(crate) fn trimmed(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Store the canonical wire value of a recognised choice, the normalized
/// input otherwise.
pub(crate) fn canonical(field: &Option<String>, parse: fn(&str) -> Option<&'static str>) -> Option<String> {
    trimmed(field).map(|raw| match parse(&raw) {
        Some(wire) => wire.to_string(),
        None => studio_common::normalize_choice(&raw),
    })
}

/// Name and email are required on every lead form.
pub(crate) fn require_identity(name: &str, email: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("name is required".to_string()));
    }
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::Validation(format!("invalid email address: {email:?}"))),
    }
}
