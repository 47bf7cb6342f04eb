//! Reference data billed on invoices: companies, customers and products.
//!
//! Each record type has a plain field struct with `validate()` returning
//! every problem at once, and a patch type for partial updates.

pub mod company;
pub mod customer;
pub mod error;
pub mod product;
mod rules;

pub use company::{CompanyFields, CompanyPatch};
pub use customer::{CustomerFields, CustomerPatch};
pub use error::DirectoryError;
pub use product::{DEFAULT_UNIT, ProductFields, ProductPatch, ProductUpdate};
pub use rules::{GSTIN_LEN, IFSC_LEN};
