//! `SeaORM` Entity for invoice_items table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use invoicely_core::invoice::LineItem;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Option<Uuid>,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 3)))")]
    pub quantity: Decimal,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id",
        on_delete = "Cascade"
    )]
    Invoices,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Domain view of this row.
    #[must_use]
    pub fn line_item(&self) -> LineItem {
        LineItem {
            product_id: self.product_id,
            description: self.description.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            rate: self.rate,
            discount_percent: self.discount_percent,
            amount: self.amount,
        }
    }
}

impl ActiveModel {
    /// Overwrites every item column with `item`.
    pub fn set_line_item(&mut self, item: LineItem) {
        self.product_id = Set(item.product_id);
        self.description = Set(item.description);
        self.quantity = Set(item.quantity);
        self.unit = Set(item.unit);
        self.rate = Set(item.rate);
        self.discount_percent = Set(item.discount_percent);
        self.amount = Set(item.amount);
    }
}
