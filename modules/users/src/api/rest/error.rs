use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    ProblemResponse(
        Problem::new(status, title, detail)
            .with_type(format!("https://errors.example.com/{code}"))
            .with_code(code)
            .with_instance(instance),
    )
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {id} was not found"),
            instance,
        ),
        DomainError::BadRequest(message) => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_BAD_REQUEST",
            "Bad request",
            message.clone(),
            instance,
        ),
        DomainError::Validation(errors) => {
            let ProblemResponse(problem) = from_parts(
                StatusCode::UNPROCESSABLE_ENTITY,
                "USERS_VALIDATION",
                "Validation error",
                "One or more fields are invalid",
                instance,
            );
            ProblemResponse(problem.with_errors(errors.clone()))
        }
        DomainError::Repository(_) => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Repository error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
