//! Error handling for the Threadline API
//!
//! This module provides a unified error type using thiserror, with HTTP status
//! mapping via Axum's IntoResponse trait and GraphQL error codes via
//! async-graphql's ErrorExtensions.
//!
//! `ApiError` is `Clone`: a single batch failure is handed to every caller
//! that shared the batch.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Coarse error category, shared by the HTTP and GraphQL surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Upstream,
    Internal,
}

/// Main API error type
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    // ========== Resource Errors ==========
    /// Referenced post, comment or user does not exist
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    // ========== Validation Errors ==========
    /// Domain rule violated or malformed input
    #[error("validation error: {0}")]
    ValidationError(String),

    // ========== Collaborator Errors ==========
    /// Storage collaborator failed for a reason other than the database driver
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Database query failed
    #[error("database error: {0}")]
    Database(Arc<sqlx::Error>),

    // ========== Configuration Errors ==========
    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    // ========== Internal Errors ==========
    /// Loader or resolver invariant violated
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ValidationError(_) => ErrorKind::Validation,
            Self::Upstream(_) | Self::Database(_) => ErrorKind::Upstream,
            Self::Configuration(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Whether the error is an expected, per-field outcome
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::Validation)
    }

    /// Log the error with appropriate severity
    pub fn log(&self) {
        if self.is_recoverable() {
            tracing::debug!(error = %self, code = self.error_code(), "Client error");
        } else {
            tracing::error!(error = %self, code = self.error_code(), "Server error occurred");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl async_graphql::ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        self.log();

        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
        })
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

// ========== Conversion Implementations ==========

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(Arc::new(err))
    }
}

impl From<threadline_shared_config::ConfigError> for ApiError {
    fn from(err: threadline_shared_config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::ErrorExtensions;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::not_found("post", 1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("comments are disabled").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream("boom".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("mismatch".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ApiError::not_found("user", 3).kind(), ErrorKind::NotFound);
        assert_eq!(ApiError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            ApiError::Upstream("io".to_string()).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            ApiError::from(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(ApiError::not_found("comment", 9).is_recoverable());
        assert!(ApiError::validation("bad id").is_recoverable());
        assert!(!ApiError::Upstream("down".to_string()).is_recoverable());
        assert!(!ApiError::Internal("bug".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::not_found("post", 42);
        assert_eq!(err.to_string(), "post not found: 42");
    }

    #[test]
    fn test_graphql_extension_code() {
        let err = ApiError::validation("comments are disabled for this post").extend();
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("VALIDATION_ERROR")));
    }

    #[test]
    fn test_clone_shares_database_error() {
        let err = ApiError::from(sqlx::Error::PoolClosed);
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
        assert_eq!(copy.error_code(), "DATABASE_ERROR");
    }
}
