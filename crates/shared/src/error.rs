//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every domain failure is converted into one of these at the operation
/// boundary and rendered as a structured JSON error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid bearer token.
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Resource is not owned by the caller.
    #[error("Access denied: {0}")]
    Unauthorized(String),

    /// Mutation attempted outside the allowed status.
    #[error("{0}")]
    ImmutableState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Schema or field constraint violation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Debits and credits do not balance.
    #[error("{0}")]
    ImbalancedEntry(String),

    /// No account could be resolved for a required role (AR, cash).
    #[error("{0}")]
    MissingConfiguration(String),

    /// Operation may only run once per resource.
    #[error("{0}")]
    OneTimeOperation(String),

    /// Payment larger than the outstanding balance.
    #[error("{0}")]
    PaymentExceedsBalance(String),

    /// Conflict (e.g., account still referenced).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External service error (file storage).
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::Unauthorized(_) | Self::ImmutableState(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::ImbalancedEntry(_) => 422,
            Self::MissingConfiguration(_)
            | Self::OneTimeOperation(_)
            | Self::PaymentExceedsBalance(_) => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::ImmutableState(_) => "IMMUTABLE_STATE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ImbalancedEntry(_) => "IMBALANCED_ENTRY",
            Self::MissingConfiguration(_) => "MISSING_CONFIGURATION",
            Self::OneTimeOperation(_) => "ONE_TIME_OPERATION",
            Self::PaymentExceedsBalance(_) => "PAYMENT_EXCEEDS_BALANCE",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for faults the caller cannot fix by changing the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
