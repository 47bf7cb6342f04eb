//! Initial database migration.
//!
//! Creates users, reference data (companies, customers, products), the
//! invoice aggregate and the token revocation store.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: USERS & TOKEN REVOCATION
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(80).not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string_len(120).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(50))
                    .col(ColumnDef::new(Users::LastName).string_len(50))
                    .col(ColumnDef::new(Users::Phone).string_len(20))
                    .col(ColumnDef::new(Users::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone())
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RevokedTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RevokedTokens::Jti).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RevokedTokens::UserId).uuid().not_null())
                    .col(ColumnDef::new(RevokedTokens::ExpiresAt).timestamp_with_time_zone().not_null())
                    .col(timestamp(RevokedTokens::RevokedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revoked_tokens_user")
                            .from(RevokedTokens::Table, RevokedTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_revoked_tokens_expires_at")
                    .table(RevokedTokens::Table)
                    .col(RevokedTokens::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: REFERENCE DATA
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Companies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Companies::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Companies::Address).text())
                    .col(ColumnDef::new(Companies::City).string_len(100))
                    .col(ColumnDef::new(Companies::State).string_len(100))
                    .col(ColumnDef::new(Companies::Pincode).string_len(10))
                    .col(ColumnDef::new(Companies::Gstin).string_len(15))
                    .col(ColumnDef::new(Companies::ContactPhone).string_len(20))
                    .col(ColumnDef::new(Companies::Email).string_len(120))
                    .col(ColumnDef::new(Companies::BankName).string_len(200))
                    .col(ColumnDef::new(Companies::AccountNumber).string_len(50))
                    .col(ColumnDef::new(Companies::IfscCode).string_len(11))
                    .col(timestamp(Companies::CreatedAt))
                    .col(timestamp(Companies::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Customers::Address).text())
                    .col(ColumnDef::new(Customers::City).string_len(100))
                    .col(ColumnDef::new(Customers::State).string_len(100))
                    .col(ColumnDef::new(Customers::Pincode).string_len(10))
                    .col(ColumnDef::new(Customers::Gstin).string_len(15))
                    .col(ColumnDef::new(Customers::ContactPerson).string_len(100))
                    .col(ColumnDef::new(Customers::Phone).string_len(20))
                    .col(ColumnDef::new(Customers::Email).string_len(120))
                    .col(timestamp(Customers::CreatedAt))
                    .col(timestamp(Customers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::Category).string_len(100))
                    .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Products::Description).text())
                    .col(ColumnDef::new(Products::Unit).string_len(20).not_null().default("KG"))
                    .col(ColumnDef::new(Products::Rate).decimal_len(10, 2))
                    .col(ColumnDef::new(Products::HsnCode).string_len(20))
                    .col(timestamp(Products::CreatedAt))
                    .col(timestamp(Products::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_category")
                    .table(Products::Table)
                    .col(Products::Category)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: INVOICES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::InvoiceNumber).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                    .col(ColumnDef::new(Invoices::CompanyId).uuid())
                    .col(ColumnDef::new(Invoices::CustomerId).uuid())
                    .col(ColumnDef::new(Invoices::PoNumber).string_len(100))
                    .col(ColumnDef::new(Invoices::PoDate).date())
                    .col(ColumnDef::new(Invoices::PaymentMode).string_len(50).default("RTGS/NEFT"))
                    .col(ColumnDef::new(Invoices::Transport).string_len(200))
                    .col(ColumnDef::new(Invoices::DispatchFrom).string_len(200))
                    .col(money(Invoices::Subtotal))
                    .col(money(Invoices::GstAmount))
                    .col(money(Invoices::TotalAmount))
                    .col(ColumnDef::new(Invoices::Status).string_len(20).not_null().default("DRAFT"))
                    .col(timestamp(Invoices::CreatedAt))
                    .col(timestamp(Invoices::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_company")
                            .from(Invoices::Table, Invoices::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_customer")
                            .from(Invoices::Table, Invoices::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_invoices_invoice_date", Invoices::InvoiceDate),
            ("idx_invoices_status", Invoices::Status),
            ("idx_invoices_company_id", Invoices::CompanyId),
            ("idx_invoices_customer_id", Invoices::CustomerId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Invoices::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(InvoiceItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InvoiceItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InvoiceItems::InvoiceId).uuid().not_null())
                    .col(ColumnDef::new(InvoiceItems::ProductId).uuid())
                    .col(ColumnDef::new(InvoiceItems::Description).text().not_null())
                    .col(ColumnDef::new(InvoiceItems::Quantity).decimal_len(10, 3).not_null())
                    .col(ColumnDef::new(InvoiceItems::Unit).string_len(20).not_null())
                    .col(ColumnDef::new(InvoiceItems::Rate).decimal_len(10, 2).not_null())
                    .col(
                        ColumnDef::new(InvoiceItems::DiscountPercent)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(InvoiceItems::Amount).decimal_len(12, 2).not_null())
                    .col(timestamp(InvoiceItems::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_items_invoice")
                            .from(InvoiceItems::Table, InvoiceItems::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_items_product")
                            .from(InvoiceItems::Table, InvoiceItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_items_invoice_id")
                    .table(InvoiceItems::Table)
                    .col(InvoiceItems::InvoiceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InvoiceItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RevokedTokens::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn money<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .decimal_len(12, 2)
        .not_null()
        .default(0)
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    IsAdmin,
    IsActive,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RevokedTokens {
    Table,
    Jti,
    UserId,
    ExpiresAt,
    RevokedAt,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    Address,
    City,
    State,
    Pincode,
    Gstin,
    ContactPhone,
    Email,
    BankName,
    AccountNumber,
    IfscCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Address,
    City,
    State,
    Pincode,
    Gstin,
    ContactPerson,
    Phone,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Category,
    Name,
    Description,
    Unit,
    Rate,
    HsnCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Invoices {
    Table,
    Id,
    InvoiceNumber,
    InvoiceDate,
    CompanyId,
    CustomerId,
    PoNumber,
    PoDate,
    PaymentMode,
    Transport,
    DispatchFrom,
    Subtotal,
    GstAmount,
    TotalAmount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InvoiceItems {
    Table,
    Id,
    InvoiceId,
    ProductId,
    Description,
    Quantity,
    Unit,
    Rate,
    DiscountPercent,
    Amount,
    CreatedAt,
}
