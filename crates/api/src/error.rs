//! API error type and its JSON rendering.
//!
//! Every failure leaves a handler as `{success: false, error: <CODE>, message}`
//! with the status taken from the error's own mapping. Server faults are
//! logged here and reach the client with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tally_core::{
    accounts::AccountError, dimensions::DimensionError, invoicing::InvoiceError,
    ledger::LedgerError, reports::ReportError, storage::StorageError, workflow::WorkflowError,
};
use tally_db::{
    AccountRepoError, DimensionRepoError, InvoiceRepoError, PeriodRepoError, ReportRepoError,
    SettingsError, TransactionRepoError,
};
use tally_shared::AppError;
use tracing::error;
use validator::ValidationErrors;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error returned by every handler.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    /// Builds an error from a numeric status, a code and a message.
    ///
    /// Statuses of 500 and above are logged and their message is masked.
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = message.into();
        if status.is_server_error() {
            error!(code, error = %message, "Request failed");
            return Self {
                status,
                code,
                message: INTERNAL_MESSAGE.to_string(),
            };
        }
        Self {
            status,
            code,
            message,
        }
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::new(err.status_code(), err.error_code(), err.to_string())
    }
}

macro_rules! domain_errors {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    Self::new(err.http_status_code(), err.error_code(), err.to_string())
                }
            }
        )*
    };
}

domain_errors!(
    AccountError,
    DimensionError,
    LedgerError,
    WorkflowError,
    InvoiceError,
    ReportError,
    StorageError,
);

impl From<AccountRepoError> for ApiError {
    fn from(err: AccountRepoError) -> Self {
        match err {
            AccountRepoError::NotFound(id) => AppError::NotFound(format!("account {id}")).into(),
            AccountRepoError::DuplicateCode(_) => AppError::Validation(err.to_string()).into(),
            AccountRepoError::Rule(e) => e.into(),
            AccountRepoError::Database(e) => AppError::Database(e.to_string()).into(),
        }
    }
}

impl From<TransactionRepoError> for ApiError {
    fn from(err: TransactionRepoError) -> Self {
        match err {
            TransactionRepoError::NotFound(id) => {
                AppError::NotFound(format!("transaction {id}")).into()
            }
            TransactionRepoError::DuplicateReference(_) => {
                AppError::Validation(err.to_string()).into()
            }
            TransactionRepoError::Ledger(e) => e.into(),
            TransactionRepoError::Workflow(e) => e.into(),
            TransactionRepoError::Dimension(e) => e.into(),
            TransactionRepoError::Database(e) => AppError::Database(e.to_string()).into(),
        }
    }
}

impl From<InvoiceRepoError> for ApiError {
    fn from(err: InvoiceRepoError) -> Self {
        match err {
            InvoiceRepoError::NotFound(id) => AppError::NotFound(format!("invoice {id}")).into(),
            InvoiceRepoError::Forbidden(_) => AppError::Unauthorized(err.to_string()).into(),
            InvoiceRepoError::DuplicateNumber(_) | InvoiceRepoError::DuplicateReference(_) => {
                AppError::Validation(err.to_string()).into()
            }
            InvoiceRepoError::Rule(e) => e.into(),
            InvoiceRepoError::Period(e) => e.into(),
            InvoiceRepoError::Database(e) => AppError::Database(e.to_string()).into(),
        }
    }
}

impl From<DimensionRepoError> for ApiError {
    fn from(err: DimensionRepoError) -> Self {
        match err {
            DimensionRepoError::NotFound { kind, id } => {
                AppError::NotFound(format!("{} {id}", kind.label())).into()
            }
            DimensionRepoError::DuplicateCode(_) | DimensionRepoError::InvalidReference { .. } => {
                AppError::Validation(err.to_string()).into()
            }
            DimensionRepoError::Rule(e) => e.into(),
            DimensionRepoError::Database(e) => AppError::Database(e.to_string()).into(),
        }
    }
}

impl From<PeriodRepoError> for ApiError {
    fn from(err: PeriodRepoError) -> Self {
        match err {
            PeriodRepoError::NotFound(id) => AppError::NotFound(format!("period {id}")).into(),
            PeriodRepoError::DuplicateName(_) => AppError::Validation(err.to_string()).into(),
            PeriodRepoError::Rule(e) => e.into(),
            PeriodRepoError::Database(e) => AppError::Database(e.to_string()).into(),
        }
    }
}

impl From<ReportRepoError> for ApiError {
    fn from(err: ReportRepoError) -> Self {
        match err {
            ReportRepoError::Report(e) => e.into(),
            ReportRepoError::Database(e) => AppError::Database(e.to_string()).into(),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::AccountNotFound { .. } => AppError::Validation(err.to_string()).into(),
            SettingsError::Database(e) => AppError::Database(e.to_string()).into(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        fields.sort();

        let message = if fields.is_empty() {
            errors.to_string().replace('\n', "; ")
        } else {
            fields.join("; ")
        };
        AppError::Validation(message).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rust_decimal_macros::dec;
    use sea_orm::DbErr;
    use tally_core::dimensions::{DimensionKind, PeriodStatus};
    use tally_core::workflow::{GuardedOperation, TransactionStatus};
    use tally_shared::types::{AccountId, InvoiceId, TransactionId};

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_imbalance_renders_envelope() {
        let err: ApiError = TransactionRepoError::Ledger(LedgerError::Imbalanced {
            debits: dec!(250.00),
            credits: dec!(249.00),
        })
        .into();
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "IMBALANCED_ENTRY");
        assert_eq!(
            json["message"],
            "Debits must equal credits. Currently: Debits 250.00, Credits 249.00"
        );
    }

    #[tokio::test]
    async fn test_database_error_is_masked() {
        let err: ApiError =
            AccountRepoError::Database(DbErr::Custom("connection reset".into())).into();
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "DATABASE_ERROR");
        assert_eq!(json["message"], INTERNAL_MESSAGE);
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode, &str)> = vec![
            (
                WorkflowError::ImmutableState {
                    operation: GuardedOperation::Update,
                    status: TransactionStatus::Approved,
                }
                .into(),
                StatusCode::FORBIDDEN,
                "IMMUTABLE_STATE",
            ),
            (
                InvoiceRepoError::Forbidden(InvoiceId::new()).into(),
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
            ),
            (
                InvoiceError::AlreadyFinalized.into(),
                StatusCode::BAD_REQUEST,
                "ONE_TIME_OPERATION",
            ),
            (
                AccountError::ReceivableNotConfigured.into(),
                StatusCode::BAD_REQUEST,
                "MISSING_CONFIGURATION",
            ),
            (
                AccountError::InUse {
                    reason: "child accounts",
                }
                .into(),
                StatusCode::CONFLICT,
                "ACCOUNT_IN_USE",
            ),
            (
                TransactionRepoError::NotFound(TransactionId::new()).into(),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                ReportRepoError::Report(ReportError::AccountNotFound(AccountId::new())).into(),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                TransactionRepoError::DuplicateReference("JV-1".into()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                TransactionRepoError::Dimension(DimensionError::UnknownTag {
                    index: 0,
                    kind: DimensionKind::Department,
                    id: uuid::Uuid::nil(),
                })
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_DIMENSION",
            ),
            (
                PeriodRepoError::Rule(DimensionError::PeriodNotOpen {
                    action: "closed",
                    status: PeriodStatus::Closed,
                })
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "PERIOD_NOT_OPEN",
            ),
            (
                DimensionRepoError::Rule(DimensionError::InUse {
                    kind: DimensionKind::Project,
                    reason: "transaction items",
                })
                .into(),
                StatusCode::CONFLICT,
                "DIMENSION_IN_USE",
            ),
            (
                StorageError::EmptyFile.into(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status(), status, "{err}");
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_validation_errors_name_fields() {
        use validator::Validate;

        #[derive(Validate)]
        struct Payload {
            #[validate(length(min = 1, message = "is required"))]
            reference: String,
        }

        let errors = Payload {
            reference: String::new(),
        }
        .validate()
        .unwrap_err();
        let err = ApiError::from(errors);

        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), "Validation error: reference: is required");
    }
}
