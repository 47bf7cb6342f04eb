//! Invoice lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an invoice.
///
/// Any status may be set at any time through the status-update operation;
/// there is no enforced forward-only progression. The status only matters to
/// the permission gate, where non-admins may touch `Draft` invoices alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Being prepared, editable by any active user.
    #[default]
    Draft,
    /// Sent to the customer.
    Sent,
    /// Settled.
    Paid,
    /// Withdrawn.
    Cancelled,
}

impl InvoiceStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Draft, Self::Sent, Self::Paid, Self::Cancelled];

    /// Returns the stored string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from its stored form. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "SENT" => Some(Self::Sent),
            "PAID" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
