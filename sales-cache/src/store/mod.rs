//! Primary store abstractions
//!
//! The cache-aside engine only needs [`QuerySource`]; services additionally
//! use [`EntityRepository`] for writes and identity lookups.

pub mod memory;

pub use memory::MemoryStore;

use crate::cancel::CancelSignal;
use crate::domain::entity::Entity;
use crate::error::Result;
use crate::query::descriptor::Filter;
use crate::query::plan::QueryPlan;
use async_trait::async_trait;
use uuid::Uuid;

/// Executes query plans against the source of truth
#[async_trait]
pub trait QuerySource<T: Entity>: Send + Sync {
    /// Apply filter, then order, then the skip/take window when present
    async fn fetch<'a>(&self, plan: &QueryPlan<'a, T>) -> Result<Vec<T>>;
}

/// Persistence operations for one aggregate type
#[async_trait]
pub trait EntityRepository<T: Entity>: QuerySource<T> {
    /// Insert a new entity; `Conflict` if its identity already exists
    async fn create(&self, entity: T, cancel: &CancelSignal) -> Result<T>;

    async fn get_by_id(&self, id: Uuid, cancel: &CancelSignal) -> Result<Option<T>>;

    /// Replace an existing entity; `NotFound` if it does not exist
    async fn update(&self, entity: T, cancel: &CancelSignal) -> Result<T>;

    /// Remove by identity, returning whether anything was removed
    async fn delete(&self, id: Uuid, cancel: &CancelSignal) -> Result<bool>;

    async fn find(&self, filter: &Filter<T>, cancel: &CancelSignal) -> Result<Vec<T>>;
}
