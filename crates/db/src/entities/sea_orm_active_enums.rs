//! Enums stored as constrained strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use invoicely_core::invoice::InvoiceStatus as CoreInvoiceStatus;

/// Stored form of [`invoicely_core::invoice::InvoiceStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Being prepared.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Sent to the customer.
    #[sea_orm(string_value = "SENT")]
    Sent,
    /// Settled.
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Withdrawn.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<CoreInvoiceStatus> for InvoiceStatus {
    fn from(status: CoreInvoiceStatus) -> Self {
        match status {
            CoreInvoiceStatus::Draft => Self::Draft,
            CoreInvoiceStatus::Sent => Self::Sent,
            CoreInvoiceStatus::Paid => Self::Paid,
            CoreInvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvoiceStatus> for CoreInvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}
