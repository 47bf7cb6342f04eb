//! The invoice aggregate: header, line items, derived totals, numbering and
//! the permission gate.
//!
//! # Modules
//!
//! - `item` - Line items and the amount formula
//! - `totals` - Subtotal, GST and total
//! - `numbering` - Monthly `INV-YYYY-MM-NNNN` allocation
//! - `header` - Header validation, create payloads and patches
//! - `permission` - Who may edit or delete an invoice
//! - `status` - Lifecycle status
//! - `error` - Invoice error type

pub mod error;
pub mod header;
pub mod item;
pub mod numbering;
pub mod permission;
pub mod status;
pub mod totals;

#[cfg(test)]
mod calculation_props;
#[cfg(test)]
mod numbering_props;
#[cfg(test)]
mod permission_props;

pub use error::InvoiceError;
pub use header::{DEFAULT_PAYMENT_MODE, InvoiceHeader, InvoiceInput, InvoicePatch, NewInvoice, parse_date};
pub use item::{
    ItemPatch, ItemSpec, LineItem, MAX_AMOUNT, MAX_QUANTITY, MAX_RATE, build_items, compute_amount,
    round_money, round_quantity,
};
pub use numbering::{month_prefix, next_invoice_number};
pub use permission::{Actor, can_delete, can_edit};
pub use status::InvoiceStatus;
pub use totals::{GST_RATE, InvoiceTotals};
