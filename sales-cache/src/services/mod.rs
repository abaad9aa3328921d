//! Application services
//!
//! Services orchestrate validation, the primary store, the cache-aside engine
//! and the document mirror for one aggregate each.

pub mod sale_service;
pub mod user_service;

pub use sale_service::{
    BranchInput, CreateSaleCommand, CreateSaleResult, CustomerInput, ProductInput,
    SaleItemInput, SaleService,
};
pub use user_service::{CreateUserCommand, CreateUserResult, UserService};

use crate::cancel::CancelSignal;
use crate::domain::entity::Entity;
use crate::error::{CacheError, Result};
use crate::query::descriptor::{Filter, QueryDescriptor};
use crate::query::engine::CacheAsideEngine;
use crate::store::EntityRepository;
use tracing::{info, warn};
use uuid::Uuid;

/// Look an aggregate up through the cache, then the store.
///
/// The store fallback covers an empty result cached before the aggregate was
/// written.
pub(crate) async fn find_by_id<T: Entity>(
    engine: &CacheAsideEngine<T>,
    repository: &dyn EntityRepository<T>,
    id: Uuid,
    cancel: &CancelSignal,
) -> Result<T> {
    if id.is_nil() {
        return Err(CacheError::InvalidArgument {
            name: "id",
            reason: format!("{} ID must not be empty", T::NAME),
        });
    }

    let query = QueryDescriptor::new().filter(Filter::id_eq(id));
    if let Some(found) = engine.query(&query, cancel).await?.into_iter().next() {
        return Ok(found);
    }

    repository
        .get_by_id(id, cancel)
        .await?
        .ok_or_else(|| CacheError::not_found(T::NAME, id))
}

/// Load a referenced entity by id, or create it when no id was given
pub(crate) async fn resolve_reference<E, F>(
    repository: &dyn EntityRepository<E>,
    id: Option<Uuid>,
    build: F,
    cancel: &CancelSignal,
) -> Result<E>
where
    E: Entity,
    F: FnOnce() -> E,
{
    match id.filter(|id| !id.is_nil()) {
        Some(id) => repository
            .get_by_id(id, cancel)
            .await?
            .ok_or_else(|| CacheError::not_found(E::NAME, id)),
        None => {
            let entity = build();
            repository.create(entity, cancel).await
        }
    }
}

/// Cache a freshly persisted aggregate under its identity key.
///
/// The aggregate is already durable at this point, so a cancelled cache step
/// is skipped and a cache failure only fails the call when the engine is
/// configured fail-closed.
pub(crate) async fn cache_written_aggregate<T: Entity>(
    engine: &CacheAsideEngine<T>,
    entity: &T,
    cancel: &CancelSignal,
) -> Result<()> {
    match engine.store(&entity.identity_key(), entity, cancel).await {
        Ok(()) => Ok(()),
        Err(CacheError::Cancelled(_)) => {
            info!("Skipped caching {}: cancelled after persist", entity.identity_key());
            Ok(())
        }
        Err(e) if engine.config().fail_open => {
            warn!("Could not cache {}: {}", entity.identity_key(), e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
