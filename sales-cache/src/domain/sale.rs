//! The sale aggregate and its line items
//!
//! A [`Sale`] owns its [`SaleItem`]s. Items point back at their sale through
//! `sale_id` only, so the aggregate serializes as a tree and never as a cycle.

use crate::domain::entity::{round_money, Entity};
use crate::domain::external::{ExternalBranch, ExternalCustomer, ExternalProduct};
use crate::domain::validation::{RuleSet, ValidationErrorDetail};
use crate::error::{CacheError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of identical items on one line
pub const MAX_ITEM_QUANTITY: u32 = 20;

/// Discount rate for a line quantity.
///
/// Below 4 units no discount, 4-9 units 10%, 10-20 units 20%. More than 20
/// identical items cannot be sold.
pub fn discount_for_quantity(quantity: u32) -> Result<f64> {
    match quantity {
        0..=3 => Ok(0.0),
        4..=9 => Ok(0.10),
        10..=MAX_ITEM_QUANTITY => Ok(0.20),
        _ => Err(CacheError::DomainRule(format!(
            "Cannot sell more than {} identical items.",
            MAX_ITEM_QUANTITY
        ))),
    }
}

/// A product line inside a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub product: ExternalProduct,
    pub quantity: u32,
    pub discount: f64,
    pub total_amount: f64,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Build a line, applying the quantity discount tier
    pub fn new(sale_id: Uuid, quantity: u32, product: ExternalProduct) -> Result<Self> {
        let discount = discount_for_quantity(quantity)?;
        let total_amount = round_money(quantity as f64 * product.price * (1.0 - discount));

        Ok(Self {
            id: Uuid::new_v4(),
            sale_id,
            product_id: product.id,
            product,
            quantity,
            discount,
            total_amount,
            is_cancelled: false,
            created_at: Utc::now(),
        })
    }

    pub fn cancel(&mut self) {
        self.is_cancelled = true;
    }

    pub fn validate(&self) -> Vec<ValidationErrorDetail> {
        let mut rules = RuleSet::new();
        rules
            .ensure(!self.product_id.is_nil(), "ProductId", "Product ID must not be empty.")
            .ensure(self.quantity > 0, "Quantity", "Quantity must be greater than zero.")
            .ensure(
                self.quantity <= MAX_ITEM_QUANTITY,
                "Quantity",
                "Quantity cannot exceed 20 units.",
            );
        rules.into_errors()
    }
}

/// A sales transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<ExternalCustomer>,
    pub branch_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<ExternalBranch>,
    #[serde(default)]
    pub items: Vec<SaleItem>,
    pub total_amount: f64,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sale {
    pub fn new(
        sale_number: impl Into<String>,
        sale_date: DateTime<Utc>,
        customer: ExternalCustomer,
        branch: ExternalBranch,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sale_number: sale_number.into(),
            sale_date,
            customer_id: customer.id,
            customer: Some(customer),
            branch_id: branch.id,
            branch: Some(branch),
            items: Vec::new(),
            total_amount: 0.0,
            is_cancelled: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Append a line; rejected once the sale is cancelled
    pub fn add_item(&mut self, mut item: SaleItem) -> Result<()> {
        if self.is_cancelled {
            return Err(CacheError::DomainRule(
                "Cannot add items to a cancelled sale.".to_string(),
            ));
        }
        item.sale_id = self.id;
        self.total_amount = round_money(self.total_amount + item.total_amount);
        self.items.push(item);
        Ok(())
    }

    pub fn recalculate_total(&mut self) {
        self.total_amount = round_money(self.items.iter().map(|i| i.total_amount).sum());
    }

    /// Cancel the sale and every line in it
    pub fn cancel(&mut self) {
        self.is_cancelled = true;
        for item in &mut self.items {
            item.cancel();
        }
        self.updated_at = Some(Utc::now());
    }

    pub fn validate(&self) -> Vec<ValidationErrorDetail> {
        let mut rules = RuleSet::new();
        rules
            .not_empty(&self.sale_number, "SaleNumber", "Sale number cannot be empty.")
            .max_len(&self.sale_number, 50, "SaleNumber", "Sale number cannot be longer than 50 characters.")
            .ensure(self.sale_date <= Utc::now(), "SaleDate", "Sale date cannot be in the future.")
            .ensure(!self.customer_id.is_nil(), "Customer", "Customer details must be provided.")
            .ensure(!self.branch_id.is_nil(), "Branch", "Branch details must be provided.")
            .ensure(
                !self.items.is_empty(),
                "Items",
                "At least one product must be included in the sale.",
            )
            .ensure(
                self.items.iter().all(|i| i.quantity > 0),
                "Items",
                "All products must have a quantity greater than 0.",
            )
            .ensure(self.total_amount > 0.0, "TotalAmount", "Total amount must be greater than 0.");

        let expected = round_money(self.items.iter().map(|i| i.total_amount).sum());
        rules.ensure(
            (expected - self.total_amount).abs() < 0.005,
            "TotalAmount",
            "Total amount does not match the sum of sale items.",
        );

        for (index, item) in self.items.iter().enumerate() {
            rules.nested(&format!("Items[{}]", index), item.validate());
        }

        rules.into_errors()
    }
}

impl Entity for Sale {
    const NAME: &'static str = "Sale";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_sale() -> Sale {
        Sale::new(
            "S-0001",
            Utc::now() - Duration::hours(1),
            ExternalCustomer::new("Ana", "ana@example.com", "11987654321"),
            ExternalBranch::new("Centro", "Sao Paulo"),
        )
    }

    #[test]
    fn test_discount_tiers() {
        assert_eq!(discount_for_quantity(1).unwrap(), 0.0);
        assert_eq!(discount_for_quantity(3).unwrap(), 0.0);
        assert_eq!(discount_for_quantity(4).unwrap(), 0.10);
        assert_eq!(discount_for_quantity(9).unwrap(), 0.10);
        assert_eq!(discount_for_quantity(10).unwrap(), 0.20);
        assert_eq!(discount_for_quantity(20).unwrap(), 0.20);
        assert!(matches!(discount_for_quantity(21), Err(CacheError::DomainRule(_))));
    }

    #[test]
    fn test_item_total() {
        let product = ExternalProduct::new("Beer", 10.0);
        let item = SaleItem::new(Uuid::nil(), 5, product.clone()).unwrap();

        assert_eq!(item.discount, 0.10);
        assert_eq!(item.total_amount, 45.0);
        assert_eq!(item.product_id, product.id);

        assert!(SaleItem::new(Uuid::nil(), 25, product).is_err());
    }

    #[test]
    fn test_add_item_sets_parent_and_total() {
        let mut sale = sample_sale();
        let product = ExternalProduct::new("Beer", 2.5);

        sale.add_item(SaleItem::new(Uuid::nil(), 2, product.clone()).unwrap()).unwrap();
        sale.add_item(SaleItem::new(Uuid::nil(), 10, product).unwrap()).unwrap();

        assert_eq!(sale.items.len(), 2);
        assert!(sale.items.iter().all(|i| i.sale_id == sale.id));
        assert_eq!(sale.total_amount, 25.0);

        sale.recalculate_total();
        assert_eq!(sale.total_amount, 25.0);
        assert!(sale.validate().is_empty());
    }

    #[test]
    fn test_cancelled_sale_rejects_items() {
        let mut sale = sample_sale();
        sale.add_item(SaleItem::new(Uuid::nil(), 1, ExternalProduct::new("Beer", 3.0)).unwrap())
            .unwrap();
        sale.cancel();

        assert!(sale.is_cancelled);
        assert!(sale.items.iter().all(|i| i.is_cancelled));

        let result = sale.add_item(SaleItem::new(Uuid::nil(), 1, ExternalProduct::new("Wine", 9.0)).unwrap());
        assert!(matches!(result, Err(CacheError::DomainRule(_))));
    }

    #[test]
    fn test_sale_validation() {
        let mut sale = sample_sale();
        sale.sale_number = String::new();
        sale.sale_date = Utc::now() + Duration::days(1);

        let errors = sale.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.error.as_str()).collect();
        assert!(fields.contains(&"SaleNumber"));
        assert!(fields.contains(&"SaleDate"));
        assert!(fields.contains(&"Items"));
        assert!(fields.contains(&"TotalAmount"));
    }

    #[test]
    fn test_total_mismatch_detected() {
        let mut sale = sample_sale();
        sale.add_item(SaleItem::new(Uuid::nil(), 1, ExternalProduct::new("Beer", 3.0)).unwrap())
            .unwrap();
        sale.total_amount = 99.0;

        let errors = sale.validate();
        assert!(errors
            .iter()
            .any(|e| e.detail == "Total amount does not match the sum of sale items."));
    }

    #[test]
    fn test_serialization_has_no_back_reference() {
        let mut sale = sample_sale();
        sale.add_item(SaleItem::new(Uuid::nil(), 1, ExternalProduct::new("Beer", 3.0)).unwrap())
            .unwrap();

        let json = serde_json::to_value(&sale).unwrap();
        let item = &json["items"][0];
        assert_eq!(item["saleId"], serde_json::json!(sale.id));
        assert!(item.get("sale").is_none());

        let back: Sale = serde_json::from_value(json).unwrap();
        assert_eq!(back, sale);
    }
}
