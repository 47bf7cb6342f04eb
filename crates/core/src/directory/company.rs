//! Issuing companies.

use serde::{Deserialize, Serialize};

use super::rules::{IFSC_LEN, apply_patch, check_email, check_gstin, check_pincode, provided, require_name};

/// Editable fields of a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyFields {
    /// Legal name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Postal code, digits only.
    pub pincode: Option<String>,
    /// GST identification number.
    pub gstin: Option<String>,
    /// Contact phone.
    pub contact_phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Bank account number.
    pub account_number: Option<String>,
    /// IFSC routing code.
    pub ifsc_code: Option<String>,
}

impl CompanyFields {
    /// Returns every rule violation, empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        require_name(&mut errors, &self.name, "Company name is required");
        check_email(&mut errors, self.email.as_deref());
        check_gstin(&mut errors, self.gstin.as_deref());
        check_pincode(&mut errors, self.pincode.as_deref());
        if provided(self.ifsc_code.as_deref()).is_some_and(|code| code.chars().count() != IFSC_LEN) {
            errors.push("IFSC code must be 11 characters".to_string());
        }
        errors
    }
}

/// Partial update of a company.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyPatch {
    /// New name.
    pub name: Option<String>,
    /// New address; `null` clears.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub address: Option<Option<String>>,
    /// New city.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub city: Option<Option<String>>,
    /// New state.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub state: Option<Option<String>>,
    /// New pincode.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub pincode: Option<Option<String>>,
    /// New GSTIN.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub gstin: Option<Option<String>>,
    /// New contact phone.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub contact_phone: Option<Option<String>>,
    /// New email.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
    /// New bank name.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub bank_name: Option<Option<String>>,
    /// New account number.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub account_number: Option<Option<String>>,
    /// New IFSC code.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub ifsc_code: Option<Option<String>>,
}

impl CompanyPatch {
    /// Returns `current` with the patch applied. Validation is left to the
    /// caller.
    #[must_use]
    pub fn apply(&self, current: &CompanyFields) -> CompanyFields {
        let mut next = current.clone();
        apply_patch!(self => next;
            name, address, city, state, pincode, gstin,
            contact_phone, email, bank_name, account_number, ifsc_code,
        );
        next
    }
}
