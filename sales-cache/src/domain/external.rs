//! Customers, branches and products referenced by sales

use crate::domain::entity::Entity;
use crate::domain::validation::{RuleSet, ValidationErrorDetail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer who makes purchases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCustomer {
    pub id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExternalCustomer {
    pub fn new(
        customer_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_name: customer_name.into(),
            email: email.into(),
            phone: phone.into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Some(Utc::now());
    }

    pub fn inactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Some(Utc::now());
    }

    /// Name present and at most 200 chars, valid email, phone of 11-15 chars
    pub fn validate(&self) -> Vec<ValidationErrorDetail> {
        let mut rules = RuleSet::new();
        rules
            .not_empty(&self.customer_name, "CustomerName", "Customer name must not be empty.")
            .max_len(&self.customer_name, 200, "CustomerName", "Customer name cannot exceed 200 characters.")
            .not_empty(&self.email, "Email", "Email must not be empty.")
            .email(&self.email, "Email", "Invalid email format.")
            .ensure(
                (11..=15).contains(&self.phone.chars().count()),
                "Phone",
                "Phone number must have 11-15 digits.",
            );
        rules.into_errors()
    }
}

impl Entity for ExternalCustomer {
    const NAME: &'static str = "ExternalCustomer";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// A branch where sales are made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalBranch {
    pub id: Uuid,
    pub branch_name: String,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExternalBranch {
    pub fn new(branch_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            branch_name: branch_name.into(),
            location: location.into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Some(Utc::now());
    }

    pub fn inactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Some(Utc::now());
    }

    pub fn validate(&self) -> Vec<ValidationErrorDetail> {
        let mut rules = RuleSet::new();
        rules
            .not_empty(&self.branch_name, "BranchName", "Branch name must not be empty.")
            .max_len(&self.branch_name, 150, "BranchName", "Branch name cannot exceed 150 characters.")
            .not_empty(&self.location, "Location", "Branch location must not be empty.")
            .max_len(&self.location, 250, "Location", "Branch location cannot exceed 250 characters.");
        rules.into_errors()
    }
}

impl Entity for ExternalBranch {
    const NAME: &'static str = "ExternalBranch";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// A product that can be sold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalProduct {
    pub id: Uuid,
    pub product_name: String,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExternalProduct {
    pub fn new(product_name: impl Into<String>, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_name: product_name.into(),
            price,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Some(Utc::now());
    }

    pub fn inactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Some(Utc::now());
    }

    pub fn validate(&self) -> Vec<ValidationErrorDetail> {
        let mut rules = RuleSet::new();
        rules
            .not_empty(&self.product_name, "ProductName", "Product name must not be empty.")
            .max_len(&self.product_name, 100, "ProductName", "Product name cannot exceed 100 characters.")
            .ensure(self.price > 0.0, "Price", "Product price must be greater than zero.");
        rules.into_errors()
    }
}

impl Entity for ExternalProduct {
    const NAME: &'static str = "ExternalProduct";

    fn id(&self) -> Uuid {
        self.id
    }
}
