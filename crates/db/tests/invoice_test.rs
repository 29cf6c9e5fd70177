//! Integration tests for invoice postings.

#![allow(clippy::unwrap_used)]

mod common;

use rust_decimal_macros::dec;
use tally_core::accounts::PaymentMethod;
use tally_core::invoicing::{InvoiceError, InvoiceLine, PaymentInput};
use tally_db::entities::sea_orm_active_enums::InvoiceStatus;
use tally_db::repositories::invoice::{InvoiceInput, InvoiceRepoError, InvoiceRepository};
use tally_shared::types::{InvoiceId, UserId};

use common::{Chart, TestDb, date, seed_chart, transaction_count};

async fn finalized_invoice(
    repo: &InvoiceRepository,
    chart: &Chart,
    user: UserId,
) -> InvoiceId {
    let input = InvoiceInput {
        invoice_number: "2026-0042".into(),
        customer_name: "Acme Corp".into(),
        customer_email: None,
        customer_phone: None,
        invoice_date: date(2026, 3, 2),
        due_date: date(2026, 4, 1),
        notes: None,
        lines: vec![InvoiceLine {
            description: "Consulting".into(),
            quantity: dec!(2),
            unit_price: dec!(50.00),
            account_id: Some(chart.sales),
        }],
    };
    let today = date(2026, 3, 2);
    let created = repo.create_invoice(user, input, today).await.unwrap();
    let id = InvoiceId::from_uuid(created.invoice.id);
    repo.finalize_invoice(user, id, today).await.unwrap();
    id
}

fn payment(amount: rust_decimal::Decimal) -> PaymentInput {
    PaymentInput {
        amount,
        payment_date: date(2026, 3, 10),
        method: PaymentMethod::Cash,
    }
}

#[tokio::test]
async fn test_second_finalize_creates_no_transaction() {
    let Some(test_db) = TestDb::start().await else {
        return;
    };
    let chart = seed_chart(&test_db.db).await.unwrap();
    let repo = InvoiceRepository::new(test_db.db.clone());
    let user = UserId::new();

    let id = finalized_invoice(&repo, &chart, user).await;
    assert_eq!(transaction_count(&test_db.db).await, 1);

    let again = repo.finalize_invoice(user, id, date(2026, 3, 3)).await;
    assert!(matches!(
        again,
        Err(InvoiceRepoError::Rule(InvoiceError::AlreadyFinalized))
    ));
    assert_eq!(transaction_count(&test_db.db).await, 1);

    let detail = repo.find_invoice(user, id, date(2026, 3, 3)).await.unwrap();
    assert_eq!(detail.invoice.status, InvoiceStatus::Unpaid);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_overpayment_leaves_paid_amount_unchanged() {
    let Some(test_db) = TestDb::start().await else {
        return;
    };
    let chart = seed_chart(&test_db.db).await.unwrap();
    let repo = InvoiceRepository::new(test_db.db.clone());
    let user = UserId::new();
    let today = date(2026, 3, 10);

    let id = finalized_invoice(&repo, &chart, user).await;
    let (partial, _) = repo
        .record_payment(user, id, payment(dec!(60.00)), today)
        .await
        .unwrap();
    assert_eq!(partial.invoice.paid_amount, dec!(60.00));
    assert_eq!(partial.invoice.status, InvoiceStatus::PartiallyPaid);

    let over = repo
        .record_payment(user, id, payment(dec!(50.00)), today)
        .await;
    assert!(matches!(
        over,
        Err(InvoiceRepoError::Rule(InvoiceError::PaymentExceedsBalance { .. }))
    ));

    let detail = repo.find_invoice(user, id, today).await.unwrap();
    assert_eq!(detail.invoice.paid_amount, dec!(60.00));
    assert_eq!(detail.balance, dec!(40.00));
    assert_eq!(detail.invoice.payment_count, 1);
    // Finalize plus the one accepted payment.
    assert_eq!(transaction_count(&test_db.db).await, 2);

    test_db.cleanup().await;
}
