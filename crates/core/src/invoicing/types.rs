//! Invoice domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{AccountId, TransactionId};

/// Invoice status.
///
/// Lifecycle: Draft → Sent → (finalize) Unpaid → PartiallyPaid → Paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Editable.
    Draft,
    /// Sent to the customer, not yet booked.
    Sent,
    /// Booked to the ledger, nothing paid.
    Unpaid,
    /// Some payments received.
    PartiallyPaid,
    /// Fully paid.
    Paid,
    /// Past due.
    Overdue,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "unpaid" => Some(Self::Unpaid),
            "partially_paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of an invoice the domain rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSnapshot {
    /// Unique invoice number.
    pub invoice_number: String,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Sum of line amounts.
    pub total_amount: Decimal,
    /// Sum of recorded payments.
    pub paid_amount: Decimal,
    /// Current status.
    pub status: InvoiceStatus,
    /// Transaction generated on finalize.
    pub transaction_id: Option<TransactionId>,
}

/// One invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// What was sold.
    pub description: String,
    /// Quantity, at least 0.01.
    pub quantity: Decimal,
    /// Price per unit, not negative.
    pub unit_price: Decimal,
    /// Revenue account credited on finalize.
    pub account_id: Option<AccountId>,
}

/// Age band of an open invoice, by days since the invoice date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgingBucket {
    /// Fully paid invoices are not aged.
    #[serde(rename = "paid")]
    Paid,
    /// 0 to 30 days.
    #[serde(rename = "0-30")]
    Current,
    /// 31 to 60 days.
    #[serde(rename = "31-60")]
    Days31To60,
    /// 61 to 90 days.
    #[serde(rename = "61-90")]
    Days61To90,
    /// More than 90 days.
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    /// Bucket for a number of days outstanding.
    #[must_use]
    pub const fn for_days(days: i64) -> Self {
        match days {
            i64::MIN..=30 => Self::Current,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }

    /// Report label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Current => "0-30",
            Self::Days31To60 => "31-60",
            Self::Days61To90 => "61-90",
            Self::Over90 => "90+",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_status_round_trip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Unpaid,
            InvoiceStatus::PartiallyPaid,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
        ] {
            assert_eq!(InvoiceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(InvoiceStatus::parse("void"), None);
    }

    #[rstest]
    #[case(0, AgingBucket::Current)]
    #[case(30, AgingBucket::Current)]
    #[case(31, AgingBucket::Days31To60)]
    #[case(60, AgingBucket::Days31To60)]
    #[case(61, AgingBucket::Days61To90)]
    #[case(90, AgingBucket::Days61To90)]
    #[case(91, AgingBucket::Over90)]
    fn test_bucket_boundaries(#[case] days: i64, #[case] expected: AgingBucket) {
        assert_eq!(AgingBucket::for_days(days), expected);
    }

    #[test]
    fn test_bucket_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&AgingBucket::Days61To90).unwrap(),
            "\"61-90\""
        );
    }
}
