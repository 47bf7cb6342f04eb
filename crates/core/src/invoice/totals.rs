//! Invoice totals.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;
use super::item::{MAX_AMOUNT, round_money};

/// Flat GST rate applied to every invoice subtotal.
pub const GST_RATE: Decimal = dec!(0.18);

/// The three derived money fields of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line amounts.
    pub subtotal: Decimal,
    /// `subtotal * GST_RATE`.
    pub gst_amount: Decimal,
    /// `subtotal + gst_amount`.
    pub total_amount: Decimal,
}

impl InvoiceTotals {
    /// Computes totals from the stored amounts of an invoice's items.
    ///
    /// The caller must pass the item set as it exists in storage, not an
    /// in-memory copy that may be missing unflushed writes.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::AmountOutOfRange` if the sum overflows or the
    /// total does not fit the stored precision.
    pub fn from_amounts<I>(amounts: I) -> Result<Self, InvoiceError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let sum = amounts
            .into_iter()
            .try_fold(Decimal::ZERO, Decimal::checked_add)
            .ok_or(InvoiceError::AmountOutOfRange)?;
        let subtotal = round_money(sum);
        let gst_amount = subtotal
            .checked_mul(GST_RATE)
            .map(round_money)
            .ok_or(InvoiceError::AmountOutOfRange)?;
        let total_amount = subtotal
            .checked_add(gst_amount)
            .filter(|total| *total < MAX_AMOUNT)
            .ok_or(InvoiceError::AmountOutOfRange)?;

        Ok(Self {
            subtotal,
            gst_amount,
            total_amount,
        })
    }
}
