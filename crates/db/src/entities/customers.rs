//! `SeaORM` Entity for customers table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use invoicely_core::directory::CustomerFields;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Editable fields of this row.
    #[must_use]
    pub fn fields(&self) -> CustomerFields {
        CustomerFields {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
            gstin: self.gstin.clone(),
            contact_person: self.contact_person.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

impl ActiveModel {
    /// Overwrites every editable column with `fields`.
    pub fn set_fields(&mut self, fields: CustomerFields) {
        self.name = Set(fields.name.trim().to_string());
        self.address = Set(fields.address);
        self.city = Set(fields.city);
        self.state = Set(fields.state);
        self.pincode = Set(fields.pincode);
        self.gstin = Set(fields.gstin);
        self.contact_person = Set(fields.contact_person);
        self.phone = Set(fields.phone);
        self.email = Set(fields.email);
    }
}
