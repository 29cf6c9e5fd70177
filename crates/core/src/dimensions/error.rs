//! Dimension and period errors.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::types::{DimensionKind, PeriodStatus};

/// Errors raised by dimension tagging and period rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DimensionError {
    /// Tag points at a row that does not exist.
    #[error("Item {index}: {} {id} does not exist", .kind.label())]
    UnknownTag {
        /// Item position.
        index: usize,
        /// Which tag.
        kind: DimensionKind,
        /// The offending ID.
        id: Uuid,
    },

    /// Subsidiary account hangs under a different chart account.
    #[error("Item {index}: subsidiary account {id} does not belong to the item's account")]
    SubsidiaryMismatch {
        /// Item position.
        index: usize,
        /// The subsidiary account.
        id: Uuid,
    },

    /// End date before start date.
    #[error("End date {end} must be on or after start date {start}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Period is not open, so it can be neither closed again nor deleted.
    #[error("Only open periods can be {action} (period is {status})")]
    PeriodNotOpen {
        /// `closed` or `deleted`.
        action: &'static str,
        /// Current status.
        status: PeriodStatus,
    },

    /// Booking date falls inside a closed or locked period.
    #[error("Cannot book on {date}: period '{period}' is {status}")]
    PeriodClosed {
        /// Booking date.
        date: NaiveDate,
        /// Period name.
        period: String,
        /// Its status.
        status: PeriodStatus,
    },

    /// Row is still referenced by ledger lines.
    #[error("Cannot delete {} that is used by {reason}", .kind.label())]
    InUse {
        /// What is being deleted.
        kind: DimensionKind,
        /// What still references it.
        reason: &'static str,
    },
}

impl DimensionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTag { .. } | Self::SubsidiaryMismatch { .. } => "INVALID_DIMENSION",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::PeriodNotOpen { .. } => "PERIOD_NOT_OPEN",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::InUse { .. } => "DIMENSION_IN_USE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InUse { .. } => 409,
            _ => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = DimensionError::UnknownTag {
            index: 1,
            kind: DimensionKind::Project,
            id: Uuid::nil(),
        };
        assert_eq!(
            err.to_string(),
            format!("Item 1: project {} does not exist", Uuid::nil())
        );
        assert_eq!(err.http_status_code(), 422);

        let err = DimensionError::PeriodNotOpen {
            action: "closed",
            status: PeriodStatus::Closed,
        };
        assert_eq!(err.to_string(), "Only open periods can be closed (period is closed)");
        assert_eq!(err.error_code(), "PERIOD_NOT_OPEN");
    }

    #[test]
    fn test_in_use_is_conflict() {
        let err = DimensionError::InUse {
            kind: DimensionKind::Department,
            reason: "transaction items",
        };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(
            err.to_string(),
            "Cannot delete department that is used by transaction items"
        );
    }
}
