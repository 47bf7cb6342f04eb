//! Shared fixtures for repository tests.
//!
//! Each test gets its own in-memory SQLite database with the real migrations
//! applied. The pool holds exactly one connection so the database lives as
//! long as the pool does.

#![allow(dead_code)]

use chrono::NaiveDate;
use invoicely_core::directory::{CompanyFields, CustomerFields, ProductFields};
use invoicely_core::invoice::{Actor, InvoiceInput, ItemSpec};
use invoicely_db::entities::{companies, customers, products};
use invoicely_db::migration::{Migrator, MigratorTrait};
use invoicely_db::{CompanyRepository, CustomerRepository, ProductRepository};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn admin() -> Actor {
    Actor::new(Uuid::now_v7(), true, true)
}

pub fn staff() -> Actor {
    Actor::new(Uuid::now_v7(), false, true)
}

pub async fn acme(db: &DatabaseConnection) -> companies::Model {
    CompanyRepository::new(db.clone())
        .create(
            &admin(),
            CompanyFields {
                name: "Acme".to_string(),
                city: Some("Pune".to_string()),
                state: Some("Maharashtra".to_string()),
                gstin: Some("27AAAAA0000A1Z5".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create company")
}

pub async fn beta_corp(db: &DatabaseConnection) -> customers::Model {
    CustomerRepository::new(db.clone())
        .create(CustomerFields {
            name: "Beta Corp".to_string(),
            city: Some("Mumbai".to_string()),
            contact_person: Some("Ravi".to_string()),
            phone: Some("+91 98765-43210".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to create customer")
}

pub async fn widget(db: &DatabaseConnection) -> products::Model {
    ProductRepository::new(db.clone())
        .create(ProductFields {
            category: Some("Hardware".to_string()),
            name: "Widget".to_string(),
            rate: Some(Decimal::from(100)),
            hsn_code: Some("8471".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to create product")
}

pub fn item(quantity: i64, rate: i64, discount: i64) -> ItemSpec {
    ItemSpec {
        product_id: None,
        description: Some(format!("{quantity} x {rate}")),
        quantity: Some(Decimal::from(quantity)),
        unit: Some("NOS".to_string()),
        rate: Some(Decimal::from(rate)),
        discount_percent: Some(Decimal::from(discount)),
    }
}

pub fn invoice_input(customer_id: Uuid, items: Vec<ItemSpec>) -> InvoiceInput {
    InvoiceInput {
        invoice_date: Some("2024-03-10".to_string()),
        customer_id: Some(customer_id),
        items,
        ..Default::default()
    }
}
