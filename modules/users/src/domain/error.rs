use modkit::api::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    NotFound { id: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Not-found for a path identity that never parsed.
    pub fn unknown_id(raw: impl Into<String>) -> Self {
        Self::NotFound { id: raw.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
