//! Database seeder for Invoicely development and testing.
//!
//! Creates the default administrator (`admin` / `admin123`) when missing,
//! and a sample company, customer and product catalogue when those tables
//! are empty. Safe to run repeatedly.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tracing::info;

use invoicely_core::auth::hash_password;
use invoicely_core::directory::{CompanyFields, CustomerFields, ProductFields};
use invoicely_core::invoice::Actor;
use invoicely_db::entities::{companies, customers, products};
use invoicely_db::migration::{Migrator, MigratorTrait};
use invoicely_db::{
    CompanyRepository, CreateUserInput, CustomerRepository, ProductRepository, UserRepository,
};
use invoicely_shared::AppConfig;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoicely=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = invoicely_db::connect(&config.database).await?;
    Migrator::up(&db, None).await?;

    let admin = seed_admin(&db).await?;
    seed_company(&db, &admin).await?;
    seed_customer(&db).await?;
    seed_products(&db).await?;

    info!("Seeding complete");
    Ok(())
}

/// Returns the admin actor, creating the account first if needed.
async fn seed_admin(db: &DatabaseConnection) -> anyhow::Result<Actor> {
    let users = UserRepository::new(db.clone());

    let admin = if let Some(existing) = users.find_by_username(ADMIN_USERNAME).await? {
        info!("Admin user already exists, skipping");
        existing
    } else {
        let password_hash = hash_password(ADMIN_PASSWORD)?;
        let created = users
            .create(CreateUserInput {
                username: ADMIN_USERNAME.to_string(),
                email: "admin@invoicely.local".to_string(),
                password_hash,
                first_name: Some("System".to_string()),
                last_name: Some("Administrator".to_string()),
                phone: None,
                is_admin: true,
            })
            .await?;
        info!(username = ADMIN_USERNAME, "Created default admin; change its password");
        created
    };

    Ok(Actor::new(admin.id, admin.is_admin, admin.is_active))
}

async fn seed_company(db: &DatabaseConnection, admin: &Actor) -> anyhow::Result<()> {
    if companies::Entity::find().count(db).await? > 0 {
        info!("Companies present, skipping");
        return Ok(());
    }

    CompanyRepository::new(db.clone())
        .create(
            admin,
            CompanyFields {
                name: "Shree Ganesh Enterprises".to_string(),
                address: Some("Plot 14, MIDC Industrial Area".to_string()),
                city: Some("Pune".to_string()),
                state: Some("Maharashtra".to_string()),
                pincode: Some("411019".to_string()),
                gstin: Some("27ABCDE1234F1Z5".to_string()),
                contact_phone: Some("+91 20 2712 3456".to_string()),
                email: Some("accounts@shreeganesh.example".to_string()),
                bank_name: Some("State Bank of India".to_string()),
                account_number: Some("30012345678".to_string()),
                ifsc_code: Some("SBIN0001234".to_string()),
            },
        )
        .await?;
    info!("Created sample company");
    Ok(())
}

async fn seed_customer(db: &DatabaseConnection) -> anyhow::Result<()> {
    if customers::Entity::find().count(db).await? > 0 {
        info!("Customers present, skipping");
        return Ok(());
    }

    CustomerRepository::new(db.clone())
        .create(CustomerFields {
            name: "Deccan Fabricators Pvt Ltd".to_string(),
            address: Some("22 Link Road".to_string()),
            city: Some("Mumbai".to_string()),
            state: Some("Maharashtra".to_string()),
            pincode: Some("400053".to_string()),
            gstin: Some("27PQRSX5678K1Z2".to_string()),
            contact_person: Some("R. Kulkarni".to_string()),
            phone: Some("+91 98200 12345".to_string()),
            email: Some("purchase@deccanfab.example".to_string()),
        })
        .await?;
    info!("Created sample customer");
    Ok(())
}

async fn seed_products(db: &DatabaseConnection) -> anyhow::Result<()> {
    if products::Entity::find().count(db).await? > 0 {
        info!("Products present, skipping");
        return Ok(());
    }

    // (category, name, unit, rate in paise, HSN)
    let catalogue = [
        ("Steel", "MS Round Bar 12mm", "KG", 6_250, "7214"),
        ("Steel", "MS Flat 50x6", "KG", 6_400, "7216"),
        ("Fasteners", "Hex Bolt M12x50", "NOS", 1_850, "7318"),
        ("Paint", "Red Oxide Primer", "LTR", 24_000, "3208"),
    ];

    let repo = ProductRepository::new(db.clone());
    for (category, name, unit, paise, hsn) in catalogue {
        repo.create(ProductFields {
            category: Some(category.to_string()),
            name: name.to_string(),
            description: None,
            unit: unit.to_string(),
            rate: Some(Decimal::new(paise, 2)),
            hsn_code: Some(hsn.to_string()),
        })
        .await?;
    }
    info!(count = catalogue.len(), "Created sample products");
    Ok(())
}
