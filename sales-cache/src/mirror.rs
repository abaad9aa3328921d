//! Read-model mirror of persisted aggregates
//!
//! Aggregates are copied as JSON documents into a secondary store after the
//! primary write succeeds. The mirror is best effort: failures are logged and
//! never surface to the caller of the service operation.

use crate::domain::entity::Entity;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Document collection name for an entity type, e.g. `sales`
pub fn collection_for<T: Entity>() -> String {
    format!("{}s", T::NAME.to_lowercase())
}

#[async_trait]
pub trait DocumentMirror: Send + Sync {
    /// Insert or replace document `id` in `collection`
    async fn upsert(&self, collection: &str, id: &str, json: String) -> Result<()>;
}

/// One JSON file per document, at `<root>/<collection>/<id>.json`
#[derive(Debug, Clone)]
pub struct FileDocumentMirror {
    root: PathBuf,
}

impl FileDocumentMirror {
    /// Directories are created lazily on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{}.json", id))
    }

    /// Read a mirrored document back
    pub async fn read(&self, collection: &str, id: &str) -> Result<Option<String>> {
        let path = self.document_path(collection, id);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::StoreError(format!(
                "Failed to read document {:?}: {}",
                path, e
            ))),
        }
    }
}

#[async_trait]
impl DocumentMirror for FileDocumentMirror {
    async fn upsert(&self, collection: &str, id: &str, json: String) -> Result<()> {
        if collection.is_empty() || id.is_empty() || id.contains(['/', '\\']) {
            return Err(CacheError::InvalidArgument {
                name: "id",
                reason: format!("cannot mirror document {:?} in {:?}", id, collection),
            });
        }

        let dir = self.root.join(collection);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            CacheError::StoreError(format!("Failed to create {:?}: {}", dir, e))
        })?;

        let path = self.document_path(collection, id);
        tokio::fs::write(&path, json).await.map_err(|e| {
            CacheError::StoreError(format!("Failed to write document {:?}: {}", path, e))
        })?;

        debug!("Mirrored {}/{}", collection, id);
        Ok(())
    }
}

/// Mirror `entity` in the background; the returned handle may be ignored
pub fn mirror_write_behind<T: Entity>(
    mirror: Arc<dyn DocumentMirror>,
    entity: &T,
) -> tokio::task::JoinHandle<()> {
    let collection = collection_for::<T>();
    let id = entity.id().to_string();
    let payload = serde_json::to_string(entity);

    tokio::spawn(async move {
        let json = match payload {
            Ok(json) => json,
            Err(e) => {
                warn!("Skipping mirror of {}/{}: {}", collection, id, e);
                return;
            }
        };

        if let Err(e) = mirror.upsert(&collection, &id, json).await {
            warn!("Mirror write failed for {}/{}: {}", collection, id, e);
        }
    })
}
