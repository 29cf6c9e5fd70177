//! Shared Postgres fixture for the repository integration tests.
//!
//! Uses `DATABASE_URL` (or `TALLY__DATABASE__URL`) when set, giving each test
//! its own schema. Otherwise starts a throwaway Postgres container. Tests
//! print a notice and return early when neither is available.

#![allow(dead_code)]

use std::env;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, Set,
};
use tally_db::entities::{accounts, transactions};
use tally_db::migration::{Migrator, MigratorTrait};
use tally_shared::types::AccountId;
use testcontainers_modules::{
    postgres::Postgres,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};
use uuid::Uuid;

fn get_database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("TALLY__DATABASE__URL"))
        .ok()
}

/// A migrated database that lives as long as the test.
pub struct TestDb {
    pub db: DatabaseConnection,
    schema: Option<String>,
    _container: Option<ContainerAsync<Postgres>>,
}

impl TestDb {
    /// Connects and runs every migration, or `None` if no Postgres is reachable.
    pub async fn start() -> Option<Self> {
        let started = match get_database_url() {
            Some(url) => Self::in_schema(&url).await,
            None => Self::in_container().await,
        };
        match started {
            Ok(test_db) => Some(test_db),
            Err(e) => {
                eprintln!("Skipping test - database not available: {e}");
                None
            }
        }
    }

    async fn in_schema(url: &str) -> Result<Self, String> {
        let schema = format!("tally_test_{}", Uuid::new_v4().simple());
        let admin = Database::connect(url).await.map_err(|e| e.to_string())?;
        admin
            .execute_unprepared(&format!("CREATE SCHEMA {schema}"))
            .await
            .map_err(|e| e.to_string())?;

        let mut options = ConnectOptions::new(url);
        options.max_connections(16).set_schema_search_path(schema.clone());
        let db = Database::connect(options).await.map_err(|e| e.to_string())?;
        Migrator::up(&db, None).await.map_err(|e| e.to_string())?;

        Ok(Self {
            db,
            schema: Some(schema),
            _container: None,
        })
    }

    async fn in_container() -> Result<Self, String> {
        let container = Postgres::default().start().await.map_err(|e| e.to_string())?;
        let host = container.get_host().await.map_err(|e| e.to_string())?;
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .map_err(|e| e.to_string())?;

        let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");
        let db = Database::connect(&url).await.map_err(|e| e.to_string())?;
        Migrator::up(&db, None).await.map_err(|e| e.to_string())?;

        Ok(Self {
            db,
            schema: None,
            _container: Some(container),
        })
    }

    /// Drops the per-test schema. Containers go away on drop.
    pub async fn cleanup(self) {
        if let Some(schema) = &self.schema {
            let _ = self
                .db
                .execute_unprepared(&format!("DROP SCHEMA {schema} CASCADE"))
                .await;
        }
    }
}

/// The chart every test starts from.
pub struct Chart {
    pub cash: AccountId,
    pub receivable: AccountId,
    pub sales: AccountId,
    pub expense: AccountId,
}

pub async fn seed_chart(db: &DatabaseConnection) -> Result<Chart, sea_orm::DbErr> {
    Ok(Chart {
        cash: insert_account(db, "CASH", "Cash on Hand", "asset").await?,
        receivable: insert_account(db, "AR", "Accounts Receivable", "asset").await?,
        sales: insert_account(db, "4000", "Sales", "revenue").await?,
        expense: insert_account(db, "5000", "Office Supplies", "expense").await?,
    })
}

pub async fn insert_account(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    account_type: &str,
) -> Result<AccountId, sea_orm::DbErr> {
    let now = Utc::now().into();
    let account = accounts::ActiveModel {
        id: Set(AccountId::new().into_inner()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        account_type: Set(account_type.to_string()),
        parent_id: Set(None),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(AccountId::from_uuid(account.id))
}

pub async fn transaction_count(db: &DatabaseConnection) -> u64 {
    transactions::Entity::find().count(db).await.unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
