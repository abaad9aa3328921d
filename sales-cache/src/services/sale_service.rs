//! Sale use cases: create, fetch by id, list by customer

use crate::cache::backend::DistributedCache;
use crate::cache::config::CacheConfig;
use crate::cancel::CancelSignal;
use crate::domain::external::{ExternalBranch, ExternalCustomer, ExternalProduct};
use crate::domain::sale::{Sale, SaleItem, MAX_ITEM_QUANTITY};
use crate::domain::validation::RuleSet;
use crate::error::{CacheError, Result};
use crate::mirror::{mirror_write_behind, DocumentMirror};
use crate::query::descriptor::{Filter, QueryDescriptor, SortOrder};
use crate::query::engine::CacheAsideEngine;
use crate::services::{cache_written_aggregate, find_by_id, resolve_reference};
use crate::store::EntityRepository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Customer on a new sale: an existing id, or the details of a new customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemInput {
    pub quantity: u32,
    pub product: ProductInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleCommand {
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer: CustomerInput,
    pub branch: BranchInput,
    pub items: Vec<SaleItemInput>,
}

fn is_new(id: Option<Uuid>) -> bool {
    id.map(|id| id.is_nil()).unwrap_or(true)
}

impl CustomerInput {
    fn build(&self) -> ExternalCustomer {
        ExternalCustomer::new(&self.customer_name, &self.email, &self.phone)
    }
}

impl BranchInput {
    fn build(&self) -> ExternalBranch {
        ExternalBranch::new(&self.branch_name, &self.location)
    }
}

impl ProductInput {
    fn build(&self) -> ExternalProduct {
        ExternalProduct::new(&self.product_name, self.price)
    }
}

impl CreateSaleCommand {
    /// Sale number 5-20 alphanumeric chars, date not in the future, and at
    /// least one line with 1-20 units. New references are validated in full.
    pub fn validate(&self) -> Result<()> {
        let mut rules = RuleSet::new();
        rules
            .not_empty(&self.sale_number, "SaleNumber", "Sale number is required.")
            .ensure(
                self.sale_number.chars().all(|c| c.is_ascii_alphanumeric()),
                "SaleNumber",
                "Sale number must be alphanumeric.",
            )
            .ensure(
                (5..=20).contains(&self.sale_number.chars().count()),
                "SaleNumber",
                "Sale number must be between 5 and 20 characters.",
            )
            .ensure(
                self.sale_date <= Utc::now(),
                "SaleDate",
                "Sale date must be in the past or present.",
            )
            .ensure(
                !self.items.is_empty(),
                "SaleItems",
                "At least one product must be included in the sale.",
            )
            .ensure(
                self.items.iter().all(|i| i.quantity > 0),
                "SaleItems",
                "Each item must have a positive quantity and unit price.",
            )
            .ensure(
                self.items.iter().all(|i| i.quantity <= MAX_ITEM_QUANTITY),
                "SaleItems",
                "You cannot have more than 20 of a quantity for each product.",
            );

        if is_new(self.customer.id) {
            rules.nested("Customer", self.customer.build().validate());
        }
        if is_new(self.branch.id) {
            rules.nested("Branch", self.branch.build().validate());
        }
        for (index, item) in self.items.iter().enumerate() {
            if is_new(item.product.id) {
                rules.nested(
                    &format!("SaleItems[{}].Product", index),
                    item.product.build().validate(),
                );
            }
        }

        rules.into_result()
    }
}

/// What the caller gets back after creating a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleResult {
    pub id: Uuid,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: Uuid,
    pub branch_id: Uuid,
    pub total_amount: f64,
    pub item_count: usize,
    pub is_cancelled: bool,
}

impl From<&Sale> for CreateSaleResult {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id,
            sale_number: sale.sale_number.clone(),
            sale_date: sale.sale_date,
            customer_id: sale.customer_id,
            branch_id: sale.branch_id,
            total_amount: sale.total_amount,
            item_count: sale.items.len(),
            is_cancelled: sale.is_cancelled,
        }
    }
}

pub struct SaleService {
    sales: Arc<dyn EntityRepository<Sale>>,
    customers: Arc<dyn EntityRepository<ExternalCustomer>>,
    branches: Arc<dyn EntityRepository<ExternalBranch>>,
    products: Arc<dyn EntityRepository<ExternalProduct>>,
    engine: CacheAsideEngine<Sale>,
    mirror: Option<Arc<dyn DocumentMirror>>,
}

impl SaleService {
    pub fn new<S>(
        sales: Arc<S>,
        customers: Arc<dyn EntityRepository<ExternalCustomer>>,
        branches: Arc<dyn EntityRepository<ExternalBranch>>,
        products: Arc<dyn EntityRepository<ExternalProduct>>,
        cache: Arc<dyn DistributedCache>,
        config: CacheConfig,
    ) -> Self
    where
        S: EntityRepository<Sale> + 'static,
    {
        let engine: CacheAsideEngine<Sale> = CacheAsideEngine::new(sales.clone(), cache, config);
        Self {
            sales,
            customers,
            branches,
            products,
            engine,
            mirror: None,
        }
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn DocumentMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn engine(&self) -> &CacheAsideEngine<Sale> {
        &self.engine
    }

    /// Validate, resolve references, price the lines, persist and cache a new sale
    pub async fn create_sale(
        &self,
        command: CreateSaleCommand,
        cancel: &CancelSignal,
    ) -> Result<CreateSaleResult> {
        command.validate()?;

        let customer = resolve_reference(
            self.customers.as_ref(),
            command.customer.id,
            || command.customer.build(),
            cancel,
        )
        .await?;
        let branch = resolve_reference(
            self.branches.as_ref(),
            command.branch.id,
            || command.branch.build(),
            cancel,
        )
        .await?;

        let mut sale = Sale::new(&command.sale_number, command.sale_date, customer, branch);
        for line in &command.items {
            let product = resolve_reference(
                self.products.as_ref(),
                line.product.id,
                || line.product.build(),
                cancel,
            )
            .await?;
            sale.add_item(SaleItem::new(sale.id, line.quantity, product)?)?;
        }
        sale.recalculate_total();

        let errors = sale.validate();
        if !errors.is_empty() {
            return Err(CacheError::Validation(errors));
        }

        let sale = self.sales.create(sale, cancel).await?;
        info!(
            "Created sale {} ({} items, total {:.2})",
            sale.sale_number,
            sale.items.len(),
            sale.total_amount
        );

        if let Some(mirror) = &self.mirror {
            mirror_write_behind(mirror.clone(), &sale);
        }
        cache_written_aggregate(&self.engine, &sale, cancel).await?;

        Ok(CreateSaleResult::from(&sale))
    }

    /// Fetch a sale, from cache when possible
    pub async fn get_sale(&self, id: Uuid, cancel: &CancelSignal) -> Result<Sale> {
        find_by_id(&self.engine, self.sales.as_ref(), id, cancel).await
    }

    /// Page through sales whose customer name contains `customer` (case-insensitive),
    /// oldest first
    pub async fn list_sales(
        &self,
        customer: Option<&str>,
        page: u32,
        page_size: u32,
        cancel: &CancelSignal,
    ) -> Result<Vec<Sale>> {
        if page == 0 {
            return Err(CacheError::InvalidArgument {
                name: "page",
                reason: "pages start at 1".to_string(),
            });
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(CacheError::InvalidArgument {
                name: "pageSize",
                reason: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }

        let mut query = QueryDescriptor::new()
            .order_by(SortOrder::by_key("by_sale_date", |s: &Sale| s.sale_date))
            .paginate(page, page_size);

        if let Some(needle) = customer.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty()) {
            let token = format!("customer~={}", needle);
            query = query.filter(Filter::new(token, move |s: &Sale| {
                s.customer
                    .as_ref()
                    .map(|c| c.customer_name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            }));
        }

        self.engine.query(&query, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::store::MemoryStore;
    use chrono::Duration;

    struct Fixture {
        service: SaleService,
        cache: Arc<MemoryCache>,
        sales: Arc<MemoryStore<Sale>>,
        customers: Arc<MemoryStore<ExternalCustomer>>,
        products: Arc<MemoryStore<ExternalProduct>>,
    }

    fn fixture() -> Fixture {
        let cache = Arc::new(MemoryCache::new(CacheConfig::default()));
        let sales = Arc::new(MemoryStore::<Sale>::new());
        let customers = Arc::new(MemoryStore::<ExternalCustomer>::new());
        let branches = Arc::new(MemoryStore::<ExternalBranch>::new());
        let products = Arc::new(MemoryStore::<ExternalProduct>::new());

        let service = SaleService::new(
            sales.clone(),
            customers.clone(),
            branches,
            products.clone(),
            cache.clone(),
            CacheConfig::default(),
        );

        Fixture {
            service,
            cache,
            sales,
            customers,
            products,
        }
    }

    fn command(customer_name: &str, lines: &[(u32, f64)]) -> CreateSaleCommand {
        CreateSaleCommand {
            sale_number: "S12345".to_string(),
            sale_date: Utc::now() - Duration::hours(1),
            customer: CustomerInput {
                id: None,
                customer_name: customer_name.to_string(),
                email: "buyer@example.com".to_string(),
                phone: "11987654321".to_string(),
            },
            branch: BranchInput {
                id: None,
                branch_name: "Central".to_string(),
                location: "Main Street".to_string(),
            },
            items: lines
                .iter()
                .map(|(quantity, price)| SaleItemInput {
                    quantity: *quantity,
                    product: ProductInput {
                        id: None,
                        product_name: "Beer".to_string(),
                        price: *price,
                    },
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_sale_prices_lines_and_caches() {
        let f = fixture();
        let cancel = CancelSignal::never();

        // 2 x 10 (no discount) + 5 x 10 (10%) + 10 x 10 (20%)
        let result = f
            .service
            .create_sale(command("Ana", &[(2, 10.0), (5, 10.0), (10, 10.0)]), &cancel)
            .await
            .unwrap();

        assert_eq!(result.item_count, 3);
        assert!((result.total_amount - 145.0).abs() < 1e-9);
        assert_eq!(f.sales.len().await, 1);
        assert_eq!(f.products.len().await, 3);
        assert!(f.cache.contains_key(&format!("Sale:{}", result.id)).await);
    }

    #[tokio::test]
    async fn test_create_sale_rejects_invalid_command() {
        let f = fixture();
        let mut bad = command("Ana", &[(21, 10.0)]);
        bad.sale_number = "S-1".to_string();

        let result = f.service.create_sale(bad, &CancelSignal::never()).await;
        match result {
            Err(CacheError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.error == "SaleNumber"));
                assert!(errors.iter().any(|e| e.error == "SaleItems"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(f.sales.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_sale_reuses_existing_customer() {
        let f = fixture();
        let cancel = CancelSignal::never();
        let existing = ExternalCustomer::new("Bruno", "bruno@example.com", "11912345678");
        f.customers.create(existing.clone(), &cancel).await.unwrap();

        let mut cmd = command("", &[(1, 3.5)]);
        cmd.customer = CustomerInput {
            id: Some(existing.id),
            ..CustomerInput::default()
        };

        let result = f.service.create_sale(cmd, &cancel).await.unwrap();
        assert_eq!(result.customer_id, existing.id);
        assert_eq!(f.customers.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_reference_is_not_found() {
        let f = fixture();
        let mut cmd = command("", &[(1, 3.5)]);
        cmd.customer.id = Some(Uuid::new_v4());

        let result = f.service.create_sale(cmd, &CancelSignal::never()).await;
        assert!(matches!(
            result,
            Err(CacheError::NotFound { entity: "ExternalCustomer", .. })
        ));
    }

    #[tokio::test]
    async fn test_get_sale() {
        let f = fixture();
        let cancel = CancelSignal::never();
        let created = f
            .service
            .create_sale(command("Ana", &[(1, 5.0)]), &cancel)
            .await
            .unwrap();

        let sale = f.service.get_sale(created.id, &cancel).await.unwrap();
        assert_eq!(sale.id, created.id);
        assert_eq!(sale.items.len(), 1);

        assert!(matches!(
            f.service.get_sale(Uuid::nil(), &cancel).await,
            Err(CacheError::InvalidArgument { .. })
        ));
        assert!(matches!(
            f.service.get_sale(Uuid::new_v4(), &cancel).await,
            Err(CacheError::NotFound { entity: "Sale", .. })
        ));
    }

    #[tokio::test]
    async fn test_list_sales_filters_by_customer() {
        let f = fixture();
        let cancel = CancelSignal::never();
        for name in ["Ana Souza", "Bruno Lima", "ANA Costa"] {
            f.service
                .create_sale(command(name, &[(1, 5.0)]), &cancel)
                .await
                .unwrap();
        }

        let sales = f.service.list_sales(Some("ana"), 1, 10, &cancel).await.unwrap();
        assert_eq!(sales.len(), 2);

        let all = f.service.list_sales(None, 1, 2, &cancel).await.unwrap();
        assert_eq!(all.len(), 2);

        assert!(f.service.list_sales(None, 0, 10, &cancel).await.is_err());
        assert!(f.service.list_sales(None, 1, 0, &cancel).await.is_err());
    }
}
