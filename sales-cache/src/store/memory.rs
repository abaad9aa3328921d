//! In-process primary store

use crate::cancel::CancelSignal;
use crate::domain::entity::Entity;
use crate::error::{CacheError, Result};
use crate::query::descriptor::Filter;
use crate::query::plan::QueryPlan;
use crate::store::{EntityRepository, QuerySource};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Entities held in insertion order behind an async lock
#[derive(Debug)]
pub struct MemoryStore<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    pub fn with_rows(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

#[async_trait]
impl<T: Entity> QuerySource<T> for MemoryStore<T> {
    async fn fetch<'a>(&self, plan: &QueryPlan<'a, T>) -> Result<Vec<T>> {
        let rows = self.rows.read().await;
        let result = plan.apply(rows.iter().cloned());
        debug!("{} store fetch returned {} rows", T::NAME, result.len());
        Ok(result)
    }
}

#[async_trait]
impl<T: Entity> EntityRepository<T> for MemoryStore<T> {
    async fn create(&self, entity: T, cancel: &CancelSignal) -> Result<T> {
        cancel.check("store create")?;
        let mut rows = self.rows.write().await;

        if rows.iter().any(|row| row.id() == entity.id()) {
            return Err(CacheError::Conflict(format!(
                "{} with ID {} already exists",
                T::NAME,
                entity.id()
            )));
        }

        rows.push(entity.clone());
        debug!("Created {}", entity.identity_key());
        Ok(entity)
    }

    async fn get_by_id(&self, id: Uuid, cancel: &CancelSignal) -> Result<Option<T>> {
        cancel.check("store get")?;
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn update(&self, entity: T, cancel: &CancelSignal) -> Result<T> {
        cancel.check("store update")?;
        let mut rows = self.rows.write().await;

        match rows.iter_mut().find(|row| row.id() == entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                debug!("Updated {}", entity.identity_key());
                Ok(entity)
            }
            None => Err(CacheError::not_found(T::NAME, entity.id())),
        }
    }

    async fn delete(&self, id: Uuid, cancel: &CancelSignal) -> Result<bool> {
        cancel.check("store delete")?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() != before)
    }

    async fn find(&self, filter: &Filter<T>, cancel: &CancelSignal) -> Result<Vec<T>> {
        cancel.check("store find")?;
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|row| filter.matches(row)).cloned().collect())
    }
}
