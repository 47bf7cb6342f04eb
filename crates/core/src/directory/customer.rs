//! Billed customers.

use serde::{Deserialize, Serialize};

use super::rules::{apply_patch, check_email, check_gstin, check_pincode, provided, require_name};

/// Editable fields of a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerFields {
    /// Customer name.
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
    /// Person to contact.
    pub contact_person: Option<String>,
    /// Phone; digits plus spaces, `-` and `+`.
    pub phone: Option<String>,
    /// Email.
    pub email: Option<String>,
}

impl CustomerFields {
    /// Returns every rule violation, empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        require_name(&mut errors, &self.name, "Customer name is required");
        check_email(&mut errors, self.email.as_deref());
        check_gstin(&mut errors, self.gstin.as_deref());
        check_pincode(&mut errors, self.pincode.as_deref());
        if provided(self.phone.as_deref()).is_some_and(|phone| !is_phone_number(phone)) {
            errors.push("Invalid phone number format".to_string());
        }
        errors
    }
}

fn is_phone_number(phone: &str) -> bool {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Partial update of a customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
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
    /// New contact person.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub contact_person: Option<Option<String>>,
    /// New phone.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub phone: Option<Option<String>>,
    /// New email.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
}

impl CustomerPatch {
    /// Returns `current` with the patch applied.
    #[must_use]
    pub fn apply(&self, current: &CustomerFields) -> CustomerFields {
        let mut next = current.clone();
        apply_patch!(self => next;
            name, address, city, state, pincode, gstin, contact_person, phone, email,
        );
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn beta() -> CustomerFields {
        CustomerFields {
            name: "Beta Corp".into(),
            ..CustomerFields::default()
        }
    }

    #[rstest]
    #[case("+91 98765-43210", true)]
    #[case("022 2345 6789", true)]
    #[case("98765x43210", false)]
    #[case("+-", false)]
    fn test_phone_format(#[case] phone: &str, #[case] valid: bool) {
        let customer = CustomerFields {
            phone: Some(phone.into()),
            ..beta()
        };
        assert_eq!(customer.validate().is_empty(), valid);
    }

    #[test]
    fn test_customer_errors() {
        let customer = CustomerFields {
            name: String::new(),
            email: Some("beta.example".into()),
            gstin: Some("29ABCDE1234F1Z5X".into()),
            ..CustomerFields::default()
        };
        assert_eq!(
            customer.validate(),
            vec![
                "Customer name is required",
                "Invalid email format",
                "GSTIN must be 15 characters",
            ]
        );
    }

    #[test]
    fn test_patch_renames() {
        let patch = CustomerPatch {
            name: Some("Beta Industries".into()),
            phone: Some(Some("12345".into())),
            ..CustomerPatch::default()
        };
        let next = patch.apply(&beta());
        assert_eq!(next.name, "Beta Industries");
        assert_eq!(next.phone.as_deref(), Some("12345"));
        assert!(next.validate().is_empty());
    }
}
