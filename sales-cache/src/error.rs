//! Error types for cache, store and domain operations
//!
//! This module defines the single error enum used across the sales-cache
//! library, so the HTTP layer only has one type to map onto status codes.

use crate::domain::validation::ValidationErrorDetail;
use thiserror::Error;

/// Main error type for sales-cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Caller supplied an argument that must not be used (e.g. a blank aggregate)
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Cache or store backend could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Primary store failure
    #[error("Store error: {0}")]
    StoreError(String),

    /// Operation aborted through its cancel signal
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// One or more validation rules failed
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationErrorDetail>),

    /// Requested entity does not exist in cache nor store
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Entity collides with an existing one
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A domain rule rejected the operation
    #[error("Domain rule violated: {0}")]
    DomainRule(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl CacheError {
    /// Build a not-found error for an entity type
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CacheError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the error comes from an unreachable or failing backend
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            CacheError::ConnectionError(_) | CacheError::StoreError(_)
        )
    }
}

fn summarize(errors: &[ValidationErrorDetail]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for sales-cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}
