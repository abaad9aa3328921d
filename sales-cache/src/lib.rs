//! # Sales cache (sales-cache)
//!
//! Cache-aside query layer for the sales API, with the domain model and
//! application services built on top of it.
//!
//! ## Features
//!
//! - Deterministic cache keys derived from query shape (filter token, page, order)
//! - Cache-aside reads with a 5 minute TTL, direct aggregate writes with a 1 day TTL
//! - Fail-open degradation to the primary store when the cache is unavailable
//! - Cooperative cancellation of every cache and store call
//! - In-process and Redis (feature `redis`) cache backends
//! - Write-behind JSON document mirror
//!
//! ## Cache-aside query
//!
//! ```no_run
//! use sales_cache::{
//!     CacheAsideEngine, CacheConfig, CancelSignal, Filter, MemoryCache, MemoryStore,
//!     QueryDescriptor, Sale,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> sales_cache::Result<()> {
//!     let store = Arc::new(MemoryStore::<Sale>::new());
//!     let cache = Arc::new(MemoryCache::new(CacheConfig::default()));
//!     let engine: CacheAsideEngine<Sale> =
//!         CacheAsideEngine::new(store, cache, CacheConfig::default());
//!
//!     let id = uuid::Uuid::new_v4();
//!     let query = QueryDescriptor::new().filter(Filter::id_eq(id));
//!
//!     // First call reaches the store and populates `sale:id==<id>:page:1,size:10:noorder`
//!     let sales = engine.query(&query, &CancelSignal::never()).await?;
//!     println!("{} sales", sales.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cancel;
pub mod domain;
pub mod error;
pub mod mirror;
pub mod query;
pub mod services;
pub mod store;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheEntry, CacheKey, CacheOutcome, CacheStats, CacheValue,
    DistributedCache, MemoryCache,
};
#[cfg(feature = "redis")]
pub use cache::RedisCache;
pub use cancel::{CancelHandle, CancelSignal};
pub use domain::{
    Entity, ExternalBranch, ExternalCustomer, ExternalProduct, PasswordHasher, Sale, SaleItem,
    Sha256PasswordHasher, User, UserRole, UserStatus, ValidationErrorDetail,
};
pub use error::{CacheError, Result};
pub use mirror::{mirror_write_behind, DocumentMirror, FileDocumentMirror};
pub use query::{CacheAsideEngine, Filter, QueryDescriptor, QueryPlan, SortOrder};
pub use services::{
    CreateSaleCommand, CreateSaleResult, CreateUserCommand, CreateUserResult, SaleService,
    UserService,
};
pub use store::{EntityRepository, MemoryStore, QuerySource};
