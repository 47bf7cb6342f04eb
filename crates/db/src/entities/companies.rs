//! `SeaORM` Entity for companies table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use invoicely_core::directory::CompanyFields;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    pub contact_phone: Option<String>,
    pub email: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
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
    pub fn fields(&self) -> CompanyFields {
        CompanyFields {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
            gstin: self.gstin.clone(),
            contact_phone: self.contact_phone.clone(),
            email: self.email.clone(),
            bank_name: self.bank_name.clone(),
            account_number: self.account_number.clone(),
            ifsc_code: self.ifsc_code.clone(),
        }
    }
}

impl ActiveModel {
    /// Overwrites every editable column with `fields`.
    pub fn set_fields(&mut self, fields: CompanyFields) {
        self.name = Set(fields.name.trim().to_string());
        self.address = Set(fields.address);
        self.city = Set(fields.city);
        self.state = Set(fields.state);
        self.pincode = Set(fields.pincode);
        self.gstin = Set(fields.gstin);
        self.contact_phone = Set(fields.contact_phone);
        self.email = Set(fields.email);
        self.bank_name = Set(fields.bank_name);
        self.account_number = Set(fields.account_number);
        self.ifsc_code = Set(fields.ifsc_code);
    }
}
