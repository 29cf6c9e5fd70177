//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod accounts;
pub mod attachments;
pub mod dimensions;
pub mod health;
pub mod invoices;
pub mod periods;
pub mod reports;
pub mod settings;
pub mod transactions;

/// Creates the API router: public health check plus the protected resources.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(attachments::routes())
        .merge(invoices::routes())
        .merge(dimensions::routes())
        .merge(periods::routes())
        .merge(reports::routes())
        .merge(settings::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Deserializes a field that distinguishes "absent" from "explicit null".
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: absent is
/// `None`, `null` is `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// `validator` rule for ledger amounts: at least 0.01, whole cents, and no
/// more than the ledger columns hold.
pub(crate) fn money_amount(value: &rust_decimal::Decimal) -> Result<(), validator::ValidationError> {
    use tally_shared::types::{MAX_AMOUNT, is_whole_cents};

    let reason = if *value <= rust_decimal::Decimal::ZERO {
        "must be at least 0.01"
    } else if !is_whole_cents(*value) {
        "must not have more than 2 decimal places"
    } else if *value > MAX_AMOUNT {
        "must not exceed 9999999999999.99"
    } else {
        return Ok(());
    };
    Err(validator::ValidationError::new("money_amount").with_message(reason.into()))
}

/// `validator` rule for amounts that may be zero but not negative.
pub(crate) fn non_negative(value: &rust_decimal::Decimal) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(validator::ValidationError::new("non_negative")
            .with_message("must not be negative".into()));
    }
    Ok(())
}

/// `validator` rule for budgets: zero or more, whole cents, within column range.
pub(crate) fn budget_amount(value: &rust_decimal::Decimal) -> Result<(), validator::ValidationError> {
    if value.is_zero() {
        return Ok(());
    }
    money_amount(value)
}
