//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sales_cache::{CacheError, ValidationErrorDetail};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] CacheError),

    #[error("Invalid {entity} ID: {value}")]
    InvalidId { entity: &'static str, value: String },
}

/// Body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub errors: Vec<ValidationErrorDetail>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ApiError::Service(e) => match e {
                CacheError::Validation(_)
                | CacheError::InvalidArgument { .. }
                | CacheError::DomainRule(_) => StatusCode::BAD_REQUEST,
                CacheError::NotFound { .. } => StatusCode::NOT_FOUND,
                CacheError::Conflict(_) => StatusCode::CONFLICT,
                CacheError::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        let (message, errors) = match self {
            ApiError::Service(CacheError::Validation(errors)) => {
                ("Validation failed".to_string(), errors)
            }
            // Backend details stay in the log
            ApiError::Service(_) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                ("An internal error occurred".to_string(), Vec::new())
            }
            other => (other.to_string(), Vec::new()),
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CacheError::Validation(vec![]), StatusCode::BAD_REQUEST),
            (CacheError::DomainRule("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::not_found("Sale", "1"), StatusCode::NOT_FOUND),
            (CacheError::Conflict("x".into()), StatusCode::CONFLICT),
            (CacheError::Cancelled("q".into()), StatusCode::SERVICE_UNAVAILABLE),
            (CacheError::ConnectionError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }

        let invalid = ApiError::InvalidId {
            entity: "Sale",
            value: "abc".into(),
        };
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
