//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use invoicely_core::invoice::{InvoiceHeader, InvoiceTotals};

use super::sea_orm_active_enums::InvoiceStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub invoice_date: Date,
    pub company_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub po_number: Option<String>,
    pub po_date: Option<Date>,
    pub payment_mode: Option<String>,
    pub transport: Option<String>,
    pub dispatch_from: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub gst_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::invoice_items::Entity")]
    InvoiceItems,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Header fields of this row.
    #[must_use]
    pub fn header(&self) -> InvoiceHeader {
        InvoiceHeader {
            invoice_number: self.invoice_number.clone(),
            invoice_date: self.invoice_date,
            company_id: self.company_id,
            customer_id: self.customer_id,
            po_number: self.po_number.clone(),
            po_date: self.po_date,
            payment_mode: self.payment_mode.clone(),
            transport: self.transport.clone(),
            dispatch_from: self.dispatch_from.clone(),
            status: self.status.into(),
        }
    }

    /// Stored totals of this row.
    #[must_use]
    pub const fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            gst_amount: self.gst_amount,
            total_amount: self.total_amount,
        }
    }
}

impl ActiveModel {
    /// Overwrites every header column with `header`.
    pub fn set_header(&mut self, header: InvoiceHeader) {
        self.invoice_number = Set(header.invoice_number);
        self.invoice_date = Set(header.invoice_date);
        self.company_id = Set(header.company_id);
        self.customer_id = Set(header.customer_id);
        self.po_number = Set(header.po_number);
        self.po_date = Set(header.po_date);
        self.payment_mode = Set(header.payment_mode);
        self.transport = Set(header.transport);
        self.dispatch_from = Set(header.dispatch_from);
        self.status = Set(header.status.into());
    }

    /// Overwrites the three derived money columns.
    pub fn set_totals(&mut self, totals: InvoiceTotals) {
        self.subtotal = Set(totals.subtotal);
        self.gst_amount = Set(totals.gst_amount);
        self.total_amount = Set(totals.total_amount);
    }
}
