//! Seeds a default chart of accounts for development.
//!
//! Includes the accounts invoice postings look up by code: `AR` for the
//! receivable and `CASH`, `CHK`, `BANK`, `CC` for payments. Existing codes are
//! left untouched, so the seeder can be run repeatedly.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;

use anyhow::Context;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tally_core::accounts::AccountService;
use tally_db::{
    AccountRepository,
    entities::accounts,
    repositories::CreateAccountInput,
};

/// (code, name, type, parent code)
const CHART: &[(&str, &str, &str, Option<&str>)] = &[
    ("1000", "Current Assets", "asset", None),
    ("CASH", "Cash on Hand", "asset", Some("1000")),
    ("CHK", "Checking Account", "asset", Some("1000")),
    ("BANK", "Bank - Operating", "asset", Some("1000")),
    ("CC", "Credit Card Clearing", "asset", Some("1000")),
    ("AR", "Accounts Receivable", "asset", Some("1000")),
    ("1500", "Equipment", "asset", None),
    ("2000", "Accounts Payable", "liability", None),
    ("2100", "Accrued Liabilities", "liability", None),
    ("3000", "Owner's Equity", "equity", None),
    ("3100", "Retained Earnings", "equity", None),
    ("4000", "Sales Revenue", "revenue", None),
    ("4100", "Service Revenue", "revenue", None),
    ("5000", "Operating Expenses", "expense", None),
    ("5100", "Rent Expense", "expense", Some("5000")),
    ("5200", "Utilities Expense", "expense", Some("5000")),
    ("5300", "Office Supplies", "expense", Some("5000")),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("TALLY__DATABASE__URL"))
        .context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = tally_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    println!("Seeding chart of accounts...");
    let created = seed_chart(&db).await?;

    println!("Seeding complete! {created} account(s) created.");
    Ok(())
}

/// Creates every missing account of [`CHART`], parents first.
async fn seed_chart(db: &DatabaseConnection) -> anyhow::Result<usize> {
    let repo = AccountRepository::new(db.clone());
    let mut ids = HashMap::new();
    let mut created = 0;

    for &(code, name, raw_type, parent_code) in CHART {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(db)
            .await?;
        if let Some(account) = existing {
            println!("  {code} already exists, skipping...");
            ids.insert(code, account.id);
            continue;
        }

        let parent_id = parent_code
            .and_then(|parent| ids.get(parent))
            .map(|id| (*id).into());

        let account = repo
            .create_account(CreateAccountInput {
                code: code.to_string(),
                name: name.to_string(),
                account_type: AccountService::parse_type(raw_type)?,
                parent_id,
                description: None,
                is_active: true,
            })
            .await
            .with_context(|| format!("failed to create account {code}"))?;

        println!("  Created {code} {name}");
        ids.insert(code, account.id);
        created += 1;
    }

    Ok(created)
}
