use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Not authenticated: {0}")]
    Unauthenticated(anyhow::Error),

    #[error("No organization for the current user")]
    NoOrganization,

    #[error("Membership is not active")]
    MembershipInactive,

    #[error("Forbidden: requires one of {required:?}")]
    Forbidden { required: Vec<String> },

    #[error("Cross-tenant reference: {0}")]
    CrossTenantReference(anyhow::Error),

    #[error("Request context missing: {0}")]
    ContextMissing(&'static str),

    #[error("Corrupt record: {0}")]
    CorruptRecord(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Identity provider error: {0}")]
    IdentityProvider(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(err.to_string()),
            ),
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            AppError::Unauthenticated(err) => (StatusCode::UNAUTHORIZED, err.to_string(), None),
            AppError::NoOrganization => (
                StatusCode::FORBIDDEN,
                "No organization for the current user".to_string(),
                None,
            ),
            AppError::MembershipInactive => (
                StatusCode::FORBIDDEN,
                "Membership is not active".to_string(),
                None,
            ),
            AppError::Forbidden { required } => (
                StatusCode::FORBIDDEN,
                "Insufficient role".to_string(),
                Some(format!("required roles: {}", required.join(", "))),
            ),
            // A foreign organization's entity does not exist from the caller's
            // viewpoint; the kind stays distinct for diagnostics and tests.
            AppError::CrossTenantReference(err) => {
                (StatusCode::NOT_FOUND, err.to_string(), None)
            }
            AppError::ContextMissing(what) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Request context missing".to_string(),
                Some(what.to_string()),
            ),
            AppError::CorruptRecord(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Corrupt record".to_string(),
                Some(err.to_string()),
            ),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None),
            AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                Some(err.to_string()),
            ),
            AppError::IdentityProvider(err) => (
                StatusCode::BAD_GATEWAY,
                "Identity provider error".to_string(),
                Some(err.to_string()),
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(format!("{:#?}", err)),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
