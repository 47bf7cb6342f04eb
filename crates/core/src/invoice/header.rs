//! Invoice header fields, create payloads and patches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::InvoiceError;
use super::item::{ItemSpec, LineItem, build_items};
use super::status::InvoiceStatus;

/// Payment mode used when a create request does not name one.
pub const DEFAULT_PAYMENT_MODE: &str = "RTGS/NEFT";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date. Missing or blank input is `Ok(None)`.
///
/// # Errors
///
/// Returns `InvoiceError::InvalidDate` naming `field` for any other input.
pub fn parse_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, InvoiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| InvoiceError::InvalidDate {
                field,
                value: value.to_string(),
            }),
    }
}

/// A valid invoice header: everything but the items and the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Unique number, see [`super::numbering`].
    pub invoice_number: String,
    /// Issue date, never in the future when written.
    pub invoice_date: NaiveDate,
    /// Issuing company.
    pub company_id: Option<Uuid>,
    /// Billed customer. Nullable in storage, required by validation.
    pub customer_id: Option<Uuid>,
    /// Customer purchase order number.
    pub po_number: Option<String>,
    /// Customer purchase order date.
    pub po_date: Option<NaiveDate>,
    /// Payment mode.
    pub payment_mode: Option<String>,
    /// Transport details.
    pub transport: Option<String>,
    /// Dispatch origin.
    pub dispatch_from: Option<String>,
    /// Lifecycle status.
    pub status: InvoiceStatus,
}

impl InvoiceHeader {
    /// Re-checks the header against `today`.
    ///
    /// A header that was valid when written can become invalid only through
    /// direct construction; the patch and create paths validate already.
    #[must_use]
    pub fn validate(&self, today: NaiveDate) -> Vec<String> {
        match Candidate::from(self.clone()).check(today, true) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        }
    }

    /// Copies this header for a new draft dated `today`.
    #[must_use]
    pub fn duplicate(&self, invoice_number: String, today: NaiveDate) -> Self {
        Self {
            invoice_number,
            invoice_date: today,
            status: InvoiceStatus::Draft,
            ..self.clone()
        }
    }
}

/// Header fields before validation. `status == None` marks an unparseable
/// status string.
struct Candidate {
    invoice_number: String,
    invoice_date: Option<NaiveDate>,
    company_id: Option<Uuid>,
    customer_id: Option<Uuid>,
    po_number: Option<String>,
    po_date: Option<NaiveDate>,
    payment_mode: Option<String>,
    transport: Option<String>,
    dispatch_from: Option<String>,
    status: Option<InvoiceStatus>,
}

impl From<InvoiceHeader> for Candidate {
    fn from(header: InvoiceHeader) -> Self {
        Self {
            invoice_number: header.invoice_number,
            invoice_date: Some(header.invoice_date),
            company_id: header.company_id,
            customer_id: header.customer_id,
            po_number: header.po_number,
            po_date: header.po_date,
            payment_mode: header.payment_mode,
            transport: header.transport,
            dispatch_from: header.dispatch_from,
            status: Some(header.status),
        }
    }
}

impl Candidate {
    fn check(self, today: NaiveDate, require_number: bool) -> Result<InvoiceHeader, Vec<String>> {
        let mut errors = Vec::new();

        if require_number && self.invoice_number.trim().is_empty() {
            errors.push("Invoice number is required".to_string());
        }
        match self.invoice_date {
            None => errors.push("Invoice date is required".to_string()),
            Some(date) if date > today => {
                errors.push("Invoice date cannot be in the future".to_string());
            }
            Some(_) => {}
        }
        if self.customer_id.is_none() {
            errors.push("Customer is required".to_string());
        }
        if self.status.is_none() {
            errors.push("Invalid status".to_string());
        }

        match (self.invoice_date, self.status) {
            (Some(invoice_date), Some(status)) if errors.is_empty() => Ok(InvoiceHeader {
                invoice_number: self.invoice_number.trim().to_string(),
                invoice_date,
                company_id: self.company_id,
                customer_id: self.customer_id,
                po_number: self.po_number,
                po_date: self.po_date,
                payment_mode: self.payment_mode,
                transport: self.transport,
                dispatch_from: self.dispatch_from,
                status,
            }),
            _ => Err(errors),
        }
    }
}

/// Create-invoice payload as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceInput {
    /// Explicit number; allocated automatically when absent or blank.
    pub invoice_number: Option<String>,
    /// `YYYY-MM-DD`.
    pub invoice_date: Option<String>,
    /// Issuing company.
    pub company_id: Option<Uuid>,
    /// Billed customer.
    pub customer_id: Option<Uuid>,
    /// Purchase order number.
    pub po_number: Option<String>,
    /// Purchase order date, `YYYY-MM-DD`.
    pub po_date: Option<String>,
    /// Defaults to [`DEFAULT_PAYMENT_MODE`].
    pub payment_mode: Option<String>,
    /// Transport details.
    pub transport: Option<String>,
    /// Dispatch origin.
    pub dispatch_from: Option<String>,
    /// Defaults to `DRAFT`.
    pub status: Option<String>,
    /// Initial line items.
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

/// A validated create request. `header.invoice_number` is empty when the
/// number still has to be allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    /// Header with every rule checked.
    pub header: InvoiceHeader,
    /// Items with amounts computed.
    pub items: Vec<LineItem>,
}

impl NewInvoice {
    /// True if no number was supplied.
    #[must_use]
    pub fn needs_number(&self) -> bool {
        self.header.invoice_number.is_empty()
    }
}

impl InvoiceInput {
    /// Parses dates, then validates the header and every item together.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidDate` for a malformed date, otherwise
    /// `InvoiceError::Validation` with header problems followed by item
    /// problems.
    pub fn prepare(self, today: NaiveDate) -> Result<NewInvoice, InvoiceError> {
        let invoice_date = parse_date("invoice_date", self.invoice_date.as_deref())?;
        let po_date = parse_date("po_date", self.po_date.as_deref())?;

        let candidate = Candidate {
            invoice_number: self.invoice_number.unwrap_or_default(),
            invoice_date,
            company_id: self.company_id,
            customer_id: self.customer_id,
            po_number: self.po_number,
            po_date,
            payment_mode: Some(
                self.payment_mode
                    .unwrap_or_else(|| DEFAULT_PAYMENT_MODE.to_string()),
            ),
            transport: self.transport,
            dispatch_from: self.dispatch_from,
            status: self
                .status
                .as_deref()
                .map_or(Some(InvoiceStatus::Draft), InvoiceStatus::parse),
        };

        let header = candidate.check(today, false);
        let items = build_items(self.items);

        match (header, items) {
            (Ok(header), Ok(items)) => Ok(NewInvoice { header, items }),
            (header, items) => {
                let mut errors = header.err().unwrap_or_default();
                if let Err(InvoiceError::Validation(item_errors)) = items {
                    errors.extend(item_errors);
                }
                Err(InvoiceError::Validation(errors))
            }
        }
    }
}

/// Partial update of an invoice header, optionally replacing every item.
///
/// Fields that may be cleared use `Option<Option<_>>`: absent leaves the
/// value alone, `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePatch {
    /// New number.
    pub invoice_number: Option<String>,
    /// New date; `null` fails validation.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub invoice_date: Option<Option<String>>,
    /// New company.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub company_id: Option<Option<Uuid>>,
    /// New customer; `null` fails validation.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub customer_id: Option<Option<Uuid>>,
    /// New PO number.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub po_number: Option<Option<String>>,
    /// New PO date.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub po_date: Option<Option<String>>,
    /// New payment mode.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub payment_mode: Option<Option<String>>,
    /// New transport details.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub transport: Option<Option<String>>,
    /// New dispatch origin.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub dispatch_from: Option<Option<String>>,
    /// New status.
    pub status: Option<String>,
    /// Full replacement item list. An empty list removes every item.
    pub items: Option<Vec<ItemSpec>>,
}

impl InvoicePatch {
    /// Applies the header fields of the patch to `header` and validates the
    /// result. `items` is not looked at.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidDate` for a malformed date or
    /// `InvoiceError::Validation` if the patched header breaks a rule.
    pub fn apply(&self, header: &InvoiceHeader, today: NaiveDate) -> Result<InvoiceHeader, InvoiceError> {
        let mut candidate = Candidate::from(header.clone());

        if let Some(raw) = &self.invoice_date {
            candidate.invoice_date = parse_date("invoice_date", raw.as_deref())?;
        }
        if let Some(raw) = &self.po_date {
            candidate.po_date = parse_date("po_date", raw.as_deref())?;
        }
        if let Some(number) = &self.invoice_number {
            candidate.invoice_number.clone_from(number);
        }
        if let Some(company_id) = self.company_id {
            candidate.company_id = company_id;
        }
        if let Some(customer_id) = self.customer_id {
            candidate.customer_id = customer_id;
        }
        if let Some(po_number) = &self.po_number {
            candidate.po_number.clone_from(po_number);
        }
        if let Some(payment_mode) = &self.payment_mode {
            candidate.payment_mode.clone_from(payment_mode);
        }
        if let Some(transport) = &self.transport {
            candidate.transport.clone_from(transport);
        }
        if let Some(dispatch_from) = &self.dispatch_from {
            candidate.dispatch_from.clone_from(dispatch_from);
        }
        if let Some(status) = &self.status {
            candidate.status = InvoiceStatus::parse(status);
        }

        candidate
            .check(today, true)
            .map_err(InvoiceError::Validation)
    }
}
