//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tolerance used for every debit/credit balance comparison (0.01).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest amount a `NUMERIC(15, 2)` column holds (9,999,999,999,999.99).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

/// Rounds an amount to two decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true when two totals agree within [`BALANCE_TOLERANCE`].
#[must_use]
pub fn within_tolerance(left: Decimal, right: Decimal) -> bool {
    (left - right).abs() <= BALANCE_TOLERANCE
}

/// True when the amount has no fraction of a cent, so storing it at two
/// decimal places does not change it.
#[must_use]
pub fn is_whole_cents(amount: Decimal) -> bool {
    amount.round_dp(2) == amount
}

/// True for an amount a ledger line may carry: positive, whole cents, and
/// no larger than [`MAX_AMOUNT`].
#[must_use]
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_AMOUNT && is_whole_cents(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_value() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
        assert_eq!(round_money(dec!(3.14159)), dec!(3.14));
    }

    #[test]
    fn test_within_tolerance() {
        assert!(within_tolerance(dec!(100.00), dec!(100.01)));
        assert!(within_tolerance(dec!(100.01), dec!(100.00)));
        assert!(!within_tolerance(dec!(250.00), dec!(249.00)));
        assert!(!within_tolerance(dec!(100.00), dec!(100.02)));
    }

    #[test]
    fn test_max_amount_matches_column() {
        assert_eq!(MAX_AMOUNT, dec!(9999999999999.99));
    }

    #[test]
    fn test_whole_cents() {
        assert!(is_whole_cents(dec!(10.50)));
        assert!(is_whole_cents(dec!(10.500)));
        assert!(!is_whole_cents(dec!(0.335)));
    }

    #[test]
    fn test_storable_amount() {
        assert!(is_storable_amount(dec!(0.01)));
        assert!(is_storable_amount(MAX_AMOUNT));
        assert!(!is_storable_amount(Decimal::ZERO));
        assert!(!is_storable_amount(dec!(-1)));
        assert!(!is_storable_amount(dec!(0.001)));
        assert!(!is_storable_amount(MAX_AMOUNT + dec!(0.01)));
        assert!(!is_storable_amount(Decimal::MAX));
    }
}
