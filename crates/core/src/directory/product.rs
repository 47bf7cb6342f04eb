//! Catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rules::{apply_patch, provided, require_name};

/// Unit used when a product is created without one.
pub const DEFAULT_UNIT: &str = "KG";

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

/// Editable fields of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    /// Grouping used by the category listing.
    #[serde(default)]
    pub category: Option<String>,
    /// Product name.
    #[serde(default)]
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit of measure.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// List price per unit.
    #[serde(default)]
    pub rate: Option<Decimal>,
    /// Harmonized System of Nomenclature code.
    #[serde(default)]
    pub hsn_code: Option<String>,
}

impl Default for ProductFields {
    fn default() -> Self {
        Self {
            category: None,
            name: String::new(),
            description: None,
            unit: default_unit(),
            rate: None,
            hsn_code: None,
        }
    }
}

impl ProductFields {
    /// Returns every rule violation, empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        require_name(&mut errors, &self.name, "Product name is required");
        if self.rate.is_some_and(|rate| rate < Decimal::ZERO) {
            errors.push("Rate cannot be negative".to_string());
        }
        if provided(self.hsn_code.as_deref()).is_some_and(|code| {
            !code
                .chars()
                .filter(|c| *c != ' ')
                .all(char::is_alphanumeric)
        }) {
            errors.push("HSN code must be alphanumeric".to_string());
        }
        if self.unit.trim().is_empty() {
            errors.push("Unit is required".to_string());
        }
        errors
    }
}

/// Partial update of a product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    /// New category; `null` clears.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
    /// New name.
    pub name: Option<String>,
    /// New description.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    /// New unit.
    pub unit: Option<String>,
    /// New rate.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub rate: Option<Option<Decimal>>,
    /// New HSN code.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub hsn_code: Option<Option<String>>,
}

impl ProductPatch {
    /// Returns `current` with the patch applied.
    #[must_use]
    pub fn apply(&self, current: &ProductFields) -> ProductFields {
        let mut next = current.clone();
        apply_patch!(self => next; category, name, description, unit, rate, hsn_code);
        next
    }
}

/// One entry of a bulk product update: the target ID next to the fields
/// to change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    /// Product to change. Entries without one are reported, not applied.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Fields to change.
    #[serde(flatten)]
    pub patch: ProductPatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn widget() -> ProductFields {
        ProductFields {
            name: "Widget".into(),
            rate: Some(dec!(100)),
            hsn_code: Some("8471 30".into()),
            ..ProductFields::default()
        }
    }

    #[test]
    fn test_defaults_unit_to_kg() {
        let product: ProductFields = serde_json::from_str(r#"{"name": "Rice"}"#).unwrap();
        assert_eq!(product.unit, "KG");
        assert!(product.validate().is_empty());
    }

    #[test]
    fn test_zero_rate_is_allowed() {
        let product = ProductFields {
            rate: Some(Decimal::ZERO),
            ..widget()
        };
        assert!(product.validate().is_empty());
    }

    #[test]
    fn test_product_errors() {
        let product = ProductFields {
            name: String::new(),
            rate: Some(dec!(-0.01)),
            hsn_code: Some("84-71".into()),
            unit: " ".into(),
            ..ProductFields::default()
        };
        assert_eq!(
            product.validate(),
            vec![
                "Product name is required",
                "Rate cannot be negative",
                "HSN code must be alphanumeric",
                "Unit is required",
            ]
        );
    }

    #[test]
    fn test_patch_clears_rate() {
        let patch: ProductPatch = serde_json::from_str(r#"{"rate": null, "unit": "PCS"}"#).unwrap();
        let next = patch.apply(&widget());
        assert_eq!(next.rate, None);
        assert_eq!(next.unit, "PCS");
    }

    #[test]
    fn test_bulk_entry_reads_id_beside_patch() {
        let entry: ProductUpdate = serde_json::from_str(
            r#"{"id": "01890a5d-ac96-774b-bcce-b302099a8057", "rate": "150", "category": null}"#,
        )
        .unwrap();

        assert_eq!(
            entry.id,
            Some(Uuid::parse_str("01890a5d-ac96-774b-bcce-b302099a8057").unwrap())
        );
        assert_eq!(entry.patch.rate, Some(Some(Decimal::from(150))));
        assert_eq!(entry.patch.category, Some(None));
        assert_eq!(entry.patch.name, None);

        let missing: ProductUpdate = serde_json::from_str(r#"{"name": "Bolt"}"#).unwrap();
        assert_eq!(missing.id, None);
        assert_eq!(missing.patch.name.as_deref(), Some("Bolt"));
    }
}
