//! `SeaORM` Entity for products table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use invoicely_core::directory::ProductFields;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub rate: Option<Decimal>,
    pub hsn_code: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_items::Entity")]
    InvoiceItems,
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Editable fields of this row.
    #[must_use]
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            category: self.category.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            unit: self.unit.clone(),
            rate: self.rate,
            hsn_code: self.hsn_code.clone(),
        }
    }
}

impl ActiveModel {
    /// Overwrites every editable column with `fields`.
    pub fn set_fields(&mut self, fields: ProductFields) {
        self.category = Set(fields.category);
        self.name = Set(fields.name.trim().to_string());
        self.description = Set(fields.description);
        self.unit = Set(fields.unit.trim().to_string());
        self.rate = Set(fields.rate);
        self.hsn_code = Set(fields.hsn_code);
    }
}
