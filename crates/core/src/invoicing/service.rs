//! Invoice arithmetic, status gates and aging.
//!
//! Balance, overdue and aging are computed from a plain snapshot and an
//! explicit `today`, never from ambient time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::{MAX_AMOUNT, is_whole_cents, round_money};

use super::error::InvoiceError;
use super::types::{AgingBucket, InvoiceLine, InvoiceSnapshot, InvoiceStatus};

/// Outstanding balances of a set of invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgingSummary {
    /// Total outstanding.
    pub total: Decimal,
    /// Outstanding on invoices past their due date.
    pub overdue: Decimal,
    /// Outstanding aged 0-30 days.
    #[serde(rename = "0-30")]
    pub current: Decimal,
    /// Outstanding aged 31-60 days.
    #[serde(rename = "31-60")]
    pub days_31_60: Decimal,
    /// Outstanding aged 61-90 days.
    #[serde(rename = "61-90")]
    pub days_61_90: Decimal,
    /// Outstanding aged over 90 days.
    #[serde(rename = "90+")]
    pub over_90: Decimal,
}

/// Largest quantity a `NUMERIC(12, 2)` column holds.
const MAX_QUANTITY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Stateless service for invoice rules.
pub struct InvoiceService;

impl InvoiceService {
    /// Line amount: quantity × unit price, rounded to cents.
    #[must_use]
    pub fn line_amount(line: &InvoiceLine) -> Decimal {
        round_money(line.quantity * line.unit_price)
    }

    /// Invoice total: sum of line amounts.
    #[must_use]
    pub fn total(lines: &[InvoiceLine]) -> Decimal {
        lines.iter().map(Self::line_amount).sum()
    }

    /// Validates an invoice body before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `NoLines`, `InvalidLine` or `DueBeforeIssue`.
    pub fn validate_draft(
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        lines: &[InvoiceLine],
    ) -> Result<(), InvoiceError> {
        if due_date < invoice_date {
            return Err(InvoiceError::DueBeforeIssue);
        }
        if lines.is_empty() {
            return Err(InvoiceError::NoLines);
        }
        let min_quantity = Decimal::new(1, 2);
        let mut total = Decimal::ZERO;
        for (index, line) in lines.iter().enumerate() {
            if line.description.trim().is_empty() {
                return Err(InvoiceError::InvalidLine {
                    index,
                    reason: "description is required",
                });
            }
            if line.quantity < min_quantity {
                return Err(InvoiceError::InvalidLine {
                    index,
                    reason: "quantity must be at least 0.01",
                });
            }
            if line.unit_price < Decimal::ZERO {
                return Err(InvoiceError::InvalidLine {
                    index,
                    reason: "unit price cannot be negative",
                });
            }
            if !is_whole_cents(line.quantity) || !is_whole_cents(line.unit_price) {
                return Err(InvoiceError::InvalidLine {
                    index,
                    reason: "quantity and unit price allow at most 2 decimal places",
                });
            }
            if line.quantity > MAX_QUANTITY || line.unit_price > MAX_AMOUNT {
                return Err(InvoiceError::InvalidLine {
                    index,
                    reason: "quantity or unit price is too large",
                });
            }
            // Both factors are bounded, so the product cannot overflow.
            total += Self::line_amount(line);
            if total > MAX_AMOUNT {
                return Err(InvoiceError::InvalidLine {
                    index,
                    reason: "invoice total exceeds 9999999999999.99",
                });
            }
        }
        Ok(())
    }

    /// Edits and deletion require a draft.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` naming the attempted action.
    pub fn ensure_draft(status: InvoiceStatus, action: &'static str) -> Result<(), InvoiceError> {
        if status == InvoiceStatus::Draft {
            Ok(())
        } else {
            Err(InvoiceError::NotDraft { action, status })
        }
    }

    /// Draft → Sent.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` if the invoice was already sent or booked.
    pub fn send(status: InvoiceStatus) -> Result<InvoiceStatus, InvoiceError> {
        Self::ensure_draft(status, "send")?;
        Ok(InvoiceStatus::Sent)
    }

    /// Remaining balance.
    #[must_use]
    pub fn balance(invoice: &InvoiceSnapshot) -> Decimal {
        invoice.total_amount - invoice.paid_amount
    }

    /// Past the due date and not paid.
    #[must_use]
    pub fn is_overdue(invoice: &InvoiceSnapshot, today: NaiveDate) -> bool {
        today > invoice.due_date && invoice.status != InvoiceStatus::Paid
    }

    /// Whole days past the due date, zero when not overdue.
    #[must_use]
    pub fn days_overdue(invoice: &InvoiceSnapshot, today: NaiveDate) -> i64 {
        if Self::is_overdue(invoice, today) {
            (today - invoice.due_date).num_days()
        } else {
            0
        }
    }

    /// Aging bucket by days since the invoice date.
    #[must_use]
    pub fn aging_bucket(invoice: &InvoiceSnapshot, today: NaiveDate) -> AgingBucket {
        if invoice.status == InvoiceStatus::Paid {
            return AgingBucket::Paid;
        }
        AgingBucket::for_days((today - invoice.invoice_date).num_days())
    }

    /// Aggregates outstanding balances of unpaid invoices.
    ///
    /// Paid invoices are skipped. `overdue` is tallied independently of the
    /// day buckets, so an invoice contributes to both.
    #[must_use]
    pub fn aging_summary<'a>(
        invoices: impl IntoIterator<Item = &'a InvoiceSnapshot>,
        today: NaiveDate,
    ) -> AgingSummary {
        let mut summary = AgingSummary::default();
        for invoice in invoices {
            if invoice.status == InvoiceStatus::Paid {
                continue;
            }
            let balance = Self::balance(invoice);
            summary.total += balance;
            if Self::is_overdue(invoice, today) {
                summary.overdue += balance;
            }
            match Self::aging_bucket(invoice, today) {
                AgingBucket::Current => summary.current += balance,
                AgingBucket::Days31To60 => summary.days_31_60 += balance,
                AgingBucket::Days61To90 => summary.days_61_90 += balance,
                AgingBucket::Over90 => summary.over_90 += balance,
                AgingBucket::Paid => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(quantity: Decimal, unit_price: Decimal) -> InvoiceLine {
        InvoiceLine {
            description: "Consulting".into(),
            quantity,
            unit_price,
            account_id: None,
        }
    }

    fn snapshot(total: Decimal, paid: Decimal, status: InvoiceStatus) -> InvoiceSnapshot {
        InvoiceSnapshot {
            invoice_number: "1001".into(),
            invoice_date: date(2026, 1, 1),
            due_date: date(2026, 1, 31),
            total_amount: total,
            paid_amount: paid,
            status,
            transaction_id: None,
        }
    }

    #[test]
    fn test_total() {
        let lines = vec![line(dec!(2), dec!(150.00)), line(dec!(0.5), dec!(99.99))];
        assert_eq!(InvoiceService::line_amount(&lines[1]), dec!(50.00));
        assert_eq!(InvoiceService::total(&lines), dec!(350.00));
    }

    #[test]
    fn test_validate_draft_bounds_amounts() {
        let day = date(2026, 1, 1);
        assert_eq!(MAX_QUANTITY, dec!(9999999999.99));

        let sub_cent = vec![line(dec!(1), dec!(10.005))];
        assert!(matches!(
            InvoiceService::validate_draft(day, day, &sub_cent),
            Err(InvoiceError::InvalidLine { index: 0, .. })
        ));

        let huge = vec![line(dec!(1), Decimal::MAX)];
        assert!(matches!(
            InvoiceService::validate_draft(day, day, &huge),
            Err(InvoiceError::InvalidLine { index: 0, .. })
        ));

        let over_total = vec![line(dec!(1), MAX_AMOUNT), line(dec!(1), dec!(0.01))];
        assert!(matches!(
            InvoiceService::validate_draft(day, day, &over_total),
            Err(InvoiceError::InvalidLine { index: 1, .. })
        ));

        let at_limit = vec![line(dec!(1), MAX_AMOUNT)];
        assert!(InvoiceService::validate_draft(day, day, &at_limit).is_ok());
    }

    #[test]
    fn test_validate_draft() {
        let ok = vec![line(dec!(1), dec!(0))];
        assert!(InvoiceService::validate_draft(date(2026, 1, 1), date(2026, 1, 1), &ok).is_ok());
        assert_eq!(
            InvoiceService::validate_draft(date(2026, 2, 1), date(2026, 1, 1), &ok),
            Err(InvoiceError::DueBeforeIssue)
        );
        assert_eq!(
            InvoiceService::validate_draft(date(2026, 1, 1), date(2026, 1, 1), &[]),
            Err(InvoiceError::NoLines)
        );
        let bad_qty = vec![line(dec!(0), dec!(10))];
        assert!(matches!(
            InvoiceService::validate_draft(date(2026, 1, 1), date(2026, 1, 1), &bad_qty),
            Err(InvoiceError::InvalidLine { index: 0, .. })
        ));
        let bad_price = vec![line(dec!(1), dec!(10)), line(dec!(1), dec!(-1))];
        assert!(matches!(
            InvoiceService::validate_draft(date(2026, 1, 1), date(2026, 1, 1), &bad_price),
            Err(InvoiceError::InvalidLine { index: 1, .. })
        ));
    }

    #[test]
    fn test_send_only_from_draft() {
        assert_eq!(InvoiceService::send(InvoiceStatus::Draft), Ok(InvoiceStatus::Sent));
        assert!(InvoiceService::send(InvoiceStatus::Sent).is_err());
    }

    #[test]
    fn test_overdue() {
        let invoice = snapshot(dec!(100), dec!(0), InvoiceStatus::Unpaid);
        assert!(!InvoiceService::is_overdue(&invoice, date(2026, 1, 31)));
        assert!(InvoiceService::is_overdue(&invoice, date(2026, 2, 10)));
        assert_eq!(InvoiceService::days_overdue(&invoice, date(2026, 2, 10)), 10);

        let paid = snapshot(dec!(100), dec!(100), InvoiceStatus::Paid);
        assert!(!InvoiceService::is_overdue(&paid, date(2026, 6, 1)));
        assert_eq!(InvoiceService::days_overdue(&paid, date(2026, 6, 1)), 0);
    }

    #[test]
    fn test_aging_summary() {
        let today = date(2026, 3, 15);
        let mut recent = snapshot(dec!(100), dec!(0), InvoiceStatus::Unpaid);
        recent.invoice_date = date(2026, 3, 1);
        recent.due_date = date(2026, 3, 31);

        let mut old = snapshot(dec!(500), dec!(200), InvoiceStatus::PartiallyPaid);
        old.invoice_date = date(2025, 11, 1);
        old.due_date = date(2025, 12, 1);

        let paid = snapshot(dec!(900), dec!(900), InvoiceStatus::Paid);

        let summary = InvoiceService::aging_summary([&recent, &old, &paid], today);
        assert_eq!(summary.total, dec!(400));
        assert_eq!(summary.current, dec!(100));
        assert_eq!(summary.over_90, dec!(300));
        assert_eq!(summary.overdue, dec!(300));
        assert_eq!(summary.days_31_60, Decimal::ZERO);
    }
}
