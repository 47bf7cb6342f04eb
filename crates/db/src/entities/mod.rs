//! `SeaORM` entity definitions.

pub mod companies;
pub mod customers;
pub mod invoice_items;
pub mod invoices;
pub mod products;
pub mod revoked_tokens;
pub mod sea_orm_active_enums;
pub mod users;

pub mod prelude {
    //! Entity re-exports.
    pub use super::companies::Entity as Companies;
    pub use super::customers::Entity as Customers;
    pub use super::invoice_items::Entity as InvoiceItems;
    pub use super::invoices::Entity as Invoices;
    pub use super::products::Entity as Products;
    pub use super::revoked_tokens::Entity as RevokedTokens;
    pub use super::users::Entity as Users;
}
