//! Monthly invoice number allocation.
//!
//! Numbers look like `INV-2024-03-0007`: a per-month prefix followed by a
//! zero-padded sequence. Padding is a minimum width, so a month that passes
//! 9999 continues with `INV-2024-03-10000`. String order then no longer
//! matches sequence order, which is why the next number is derived from the
//! highest parsed sequence rather than from the greatest string.
//!
//! Allocation is read-then-increment. Two concurrent writers can compute the
//! same number; the unique constraint on `invoice_number` rejects the loser,
//! which must allocate again.

use chrono::{Datelike, NaiveDate};

use super::error::InvoiceError;

/// Width of the zero-padded sequence.
pub const SEQUENCE_WIDTH: usize = 4;

/// Returns the prefix shared by every invoice number of `today`'s month.
#[must_use]
pub fn month_prefix(today: NaiveDate) -> String {
    format!("INV-{}-{:02}-", today.year(), today.month())
}

/// Formats a full invoice number.
#[must_use]
pub fn format_invoice_number(today: NaiveDate, sequence: u32) -> String {
    format!(
        "{}{:0>width$}",
        month_prefix(today),
        sequence,
        width = SEQUENCE_WIDTH
    )
}

/// Extracts the sequence from a number carrying `prefix`.
///
/// Returns `None` if the prefix does not match or the suffix is not a plain
/// decimal number.
#[must_use]
pub fn parse_sequence(invoice_number: &str, prefix: &str) -> Option<u32> {
    let suffix = invoice_number.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Derives the next number for `today`'s month from the numbers already
/// issued in it.
///
/// `existing` may contain any invoice numbers; only those carrying
/// [`month_prefix`] with a plain numeric suffix count. Hand-entered numbers
/// such as `INV-2024-03-DRAFT` are skipped.
///
/// # Errors
///
/// Returns `InvoiceError::MalformedInvoiceNumber` with the offending number
/// if the highest sequence cannot be incremented.
pub fn next_invoice_number<'a, I>(today: NaiveDate, existing: I) -> Result<String, InvoiceError>
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = month_prefix(today);
    let highest = existing
        .into_iter()
        .filter_map(|number| parse_sequence(number, &prefix).map(|sequence| (sequence, number)))
        .max_by_key(|(sequence, _)| *sequence);

    let next = match highest {
        None => 1,
        Some((sequence, number)) => sequence
            .checked_add(1)
            .ok_or_else(|| InvoiceError::MalformedInvoiceNumber(number.to_string()))?,
    };
    Ok(format_invoice_number(today, next))
}
