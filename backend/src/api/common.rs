//! Error handling utilities for API responses.
//!
//! Provides the standard response envelope and the conversion from
//! service-layer errors to HTTP responses.
//!
//! # Response Format
//! All errors return consistent JSON responses containing:
//! - `message`: Human-readable message
//! - `error.error_type`: Machine-readable error category
//!
//! # Error Handling Flow
//! 1. Service layer returns a `ServiceError`
//! 2. `service_error_to_http` converts it to a status code and envelope
//! 3. Server-side faults are logged in full and reported generically

use crate::errors::ServiceError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Request timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> (StatusCode, String) {
    let (status, error_type, message) = match error {
        ServiceError::InvalidInput { message } => {
            (StatusCode::BAD_REQUEST, "invalid_input", message)
        }
        ServiceError::InvalidCredential => (
            StatusCode::UNAUTHORIZED,
            "invalid_credential",
            ServiceError::InvalidCredential.to_string(),
        ),
        ServiceError::Conflict { entity, .. } => (
            StatusCode::CONFLICT,
            "conflict",
            format!("{} already exists", entity),
        ),
        ServiceError::Unauthenticated { reason } => (
            StatusCode::UNAUTHORIZED,
            reason.error_type(),
            reason.message().to_string(),
        ),
        ServiceError::HashingFailure { message } => {
            tracing::error!("Password hashing failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "hashing_failure",
                "Internal server error".to_string(),
            )
        }
        ServiceError::SigningFailure { message } => {
            tracing::error!("Token signing failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "signing_failure",
                "Internal server error".to_string(),
            )
        }
        ServiceError::StoreUnavailable { message } => {
            tracing::error!("Session store unavailable: {}", message);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "Service temporarily unavailable".to_string(),
            )
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Internal server error".to_string(),
            )
        }
    };

    let error_response = ApiResponse::<()>::error(message, error_type);
    let body = serde_json::to_string(&error_response).unwrap_or_else(|_| {
        format!(r#"{{"success":false,"message":"{}"}}"#, error_type)
    });
    (status, body)
}
