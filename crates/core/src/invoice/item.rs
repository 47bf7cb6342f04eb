//! Invoice line items and the line amount formula.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::InvoiceError;

/// Decimal places kept for quantities.
pub const QUANTITY_SCALE: u32 = 3;
/// Decimal places kept for rates, discounts and every money amount.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound of a quantity, `decimal(10,3)`.
pub const MAX_QUANTITY: Decimal = dec!(10000000);
/// Exclusive upper bound of a rate, `decimal(10,2)`.
pub const MAX_RATE: Decimal = dec!(100000000);
/// Exclusive upper bound of a line amount or invoice total, `decimal(12,2)`.
pub const MAX_AMOUNT: Decimal = dec!(10000000000);

const HUNDRED: Decimal = dec!(100);

/// Rounds a money value to two places, half away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a quantity to three places, half away from zero.
#[must_use]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Line amount: `quantity * rate * (1 - discount_percent / 100)`.
///
/// Missing quantity or rate yields zero; a missing discount counts as zero.
///
/// # Errors
///
/// Returns `InvoiceError::AmountOutOfRange` if an intermediate product does
/// not fit in a `Decimal`.
pub fn compute_amount(
    quantity: Option<Decimal>,
    rate: Option<Decimal>,
    discount_percent: Option<Decimal>,
) -> Result<Decimal, InvoiceError> {
    let (Some(quantity), Some(rate)) = (quantity, rate) else {
        return Ok(Decimal::ZERO);
    };
    let base = quantity
        .checked_mul(rate)
        .ok_or(InvoiceError::AmountOutOfRange)?;
    let discount = base
        .checked_mul(discount_percent.unwrap_or(Decimal::ZERO))
        .and_then(|d| d.checked_div(HUNDRED))
        .ok_or(InvoiceError::AmountOutOfRange)?;
    base.checked_sub(discount)
        .map(round_money)
        .ok_or(InvoiceError::AmountOutOfRange)
}

/// A line item as received from a client, before validation.
///
/// Every field is optional on the wire so that validation can report all
/// problems at once instead of failing on the first missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Optional catalog product this line was picked from.
    pub product_id: Option<Uuid>,
    /// Free-text description.
    pub description: Option<String>,
    /// Quantity, must be positive.
    pub quantity: Option<Decimal>,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Price per unit, must be positive.
    pub rate: Option<Decimal>,
    /// Discount in percent, 0 to 100.
    pub discount_percent: Option<Decimal>,
}

impl ItemSpec {
    /// Rounds quantity, rate and discount to the precision they are stored
    /// with. Validation and the amount both work on these values.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            quantity: self.quantity.map(round_quantity),
            rate: self.rate.map(round_money),
            discount_percent: self.discount_percent.map(round_money),
            ..self.clone()
        }
    }

    /// Checks every rule against the normalized values and returns all
    /// problems in field order.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let spec = self.normalized();
        let mut errors = Vec::new();

        if is_blank(spec.description.as_deref()) {
            errors.push("Item description is required".to_string());
        }
        match spec.quantity {
            Some(q) if q >= MAX_QUANTITY => {
                errors.push(format!("Quantity must be less than {MAX_QUANTITY}"));
            }
            Some(q) if q > Decimal::ZERO => {}
            _ => errors.push("Quantity must be greater than 0".to_string()),
        }
        match spec.rate {
            Some(r) if r >= MAX_RATE => errors.push(format!("Rate must be less than {MAX_RATE}")),
            Some(r) if r > Decimal::ZERO => {}
            _ => errors.push("Rate must be greater than 0".to_string()),
        }
        if spec
            .discount_percent
            .is_some_and(|d| d < Decimal::ZERO || d > HUNDRED)
        {
            errors.push("Discount percent must be between 0 and 100".to_string());
        }
        if is_blank(spec.unit.as_deref()) {
            errors.push("Unit is required".to_string());
        }

        errors
    }

    /// Validates the input and turns it into a line item with its amount
    /// computed from the stored precision of each field.
    ///
    /// # Errors
    ///
    /// Returns the accumulated validation messages.
    pub fn build(self) -> Result<LineItem, Vec<String>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let spec = self.normalized();
        let mut item = LineItem {
            product_id: spec.product_id,
            description: spec.description.unwrap_or_default().trim().to_string(),
            quantity: spec.quantity.unwrap_or_default(),
            unit: spec.unit.unwrap_or_default().trim().to_string(),
            rate: spec.rate.unwrap_or_default(),
            discount_percent: spec.discount_percent.unwrap_or(Decimal::ZERO),
            amount: Decimal::ZERO,
        };
        match item.recompute_amount() {
            Ok(amount) if amount < MAX_AMOUNT => Ok(item),
            _ => Err(vec![format!("Item amount must be less than {MAX_AMOUNT}")]),
        }
    }
}

impl From<&LineItem> for ItemSpec {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            description: Some(item.description.clone()),
            quantity: Some(item.quantity),
            unit: Some(item.unit.clone()),
            rate: Some(item.rate),
            discount_percent: Some(item.discount_percent),
        }
    }
}

/// Validates a whole batch, all-or-nothing.
///
/// Messages are prefixed with the 1-based position of the offending item,
/// e.g. `"Item 2: Unit is required"`.
///
/// # Errors
///
/// Returns `InvoiceError::Validation` if any item is invalid; no item is
/// returned in that case.
pub fn build_items(specs: Vec<ItemSpec>) -> Result<Vec<LineItem>, InvoiceError> {
    let mut items = Vec::with_capacity(specs.len());
    let mut errors = Vec::new();

    for (index, spec) in specs.into_iter().enumerate() {
        match spec.build() {
            Ok(item) => items.push(item),
            Err(problems) => errors.extend(
                problems
                    .into_iter()
                    .map(|problem| format!("Item {}: {problem}", index + 1)),
            ),
        }
    }

    if errors.is_empty() {
        Ok(items)
    } else {
        Err(InvoiceError::Validation(errors))
    }
}

/// A validated line item. `amount` is a stored derived value: after
/// changing quantity, rate or discount call [`LineItem::recompute_amount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Optional catalog product.
    pub product_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// Quantity (3 dp).
    pub quantity: Decimal,
    /// Unit of measure.
    pub unit: String,
    /// Rate per unit (2 dp).
    pub rate: Decimal,
    /// Discount in percent (2 dp).
    pub discount_percent: Decimal,
    /// Cached line amount (2 dp).
    pub amount: Decimal,
}

impl LineItem {
    /// Refreshes `amount` from the current fields and returns it.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::AmountOutOfRange` on arithmetic overflow; the
    /// stored amount is left as it was.
    pub fn recompute_amount(&mut self) -> Result<Decimal, InvoiceError> {
        self.amount = compute_amount(
            Some(self.quantity),
            Some(self.rate),
            Some(self.discount_percent),
        )?;
        Ok(self.amount)
    }
}

/// Partial update of a single item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    /// `null` detaches the item from its product.
    #[serde(default, with = "serde_with::rust::double_option")]
    pub product_id: Option<Option<Uuid>>,
    /// New description.
    pub description: Option<String>,
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New unit.
    pub unit: Option<String>,
    /// New rate.
    pub rate: Option<Decimal>,
    /// New discount.
    pub discount_percent: Option<Decimal>,
}

impl ItemPatch {
    /// Applies the patch to `item`, revalidates, and recomputes the amount.
    /// On error `item` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Validation` if the patched item breaks a rule.
    pub fn apply(self, item: &mut LineItem) -> Result<(), InvoiceError> {
        let mut spec = ItemSpec::from(&*item);

        if let Some(product_id) = self.product_id {
            spec.product_id = product_id;
        }
        if let Some(description) = self.description {
            spec.description = Some(description);
        }
        if let Some(quantity) = self.quantity {
            spec.quantity = Some(quantity);
        }
        if let Some(unit) = self.unit {
            spec.unit = Some(unit);
        }
        if let Some(rate) = self.rate {
            spec.rate = Some(rate);
        }
        if let Some(discount_percent) = self.discount_percent {
            spec.discount_percent = Some(discount_percent);
        }

        *item = spec.build().map_err(InvoiceError::Validation)?;
        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
