//! Global application error types and handlers.
//!
//! This module defines the error taxonomy shared by the token lifecycle,
//! the credential verifier and the HTTP layer. Every variant is terminal for
//! the operation that produced it; nothing here is retried internally.

use crate::repositories::session_store::StoreError;
use crate::utils::crypto::CryptoError;
use thiserror::Error;

/// Why an inbound bearer token was not accepted.
///
/// The HTTP layer exposes only these three categories; the precise check
/// that failed (signature, expiry, superseded session) stays in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No `Authorization` header was sent.
    MissingToken,
    /// The header was present but not of the form `Bearer <token>`.
    MalformedHeader,
    /// The token failed verification or no longer matches the live session.
    InvalidToken,
}

impl TokenRejection {
    pub fn error_type(&self) -> &'static str {
        match self {
            TokenRejection::MissingToken => "missing_token",
            TokenRejection::MalformedHeader => "malformed_authorization",
            TokenRejection::InvalidToken => "invalid_token",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TokenRejection::MissingToken => "No token found",
            TokenRejection::MalformedHeader => "Bearer token not in proper format",
            TokenRejection::InvalidToken => "Token is invalid or expired",
        }
    }
}

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("{entity} already exists: {identifier}")]
    Conflict { entity: String, identifier: String },

    #[error("Password hashing failed: {message}")]
    HashingFailure { message: String },

    #[error("Token signing failed: {message}")]
    SigningFailure { message: String },

    #[error("Session store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Unauthenticated: {}", .reason.message())]
    Unauthenticated { reason: TokenRejection },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::Conflict {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn hashing_failure(message: impl Into<String>) -> Self {
        Self::HashingFailure {
            message: message.into(),
        }
    }

    pub fn signing_failure(message: impl Into<String>) -> Self {
        Self::SigningFailure {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn unauthenticated(reason: TokenRejection) -> Self {
        Self::Unauthenticated { reason }
    }

    /// Shorthand for the common "token did not verify" rejection.
    pub fn invalid_token() -> Self {
        Self::unauthenticated(TokenRejection::InvalidToken)
    }

    /// Configuration and infrastructure faults, surfaced as server errors.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            ServiceError::HashingFailure { .. }
                | ServiceError::SigningFailure { .. }
                | ServiceError::StoreUnavailable { .. }
                | ServiceError::Database { .. }
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        ServiceError::store_unavailable(error.to_string())
    }
}

impl From<CryptoError> for ServiceError {
    fn from(error: CryptoError) -> Self {
        ServiceError::hashing_failure(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_fault_classification() {
        assert!(ServiceError::signing_failure("bad key").is_server_fault());
        assert!(ServiceError::hashing_failure("bad cost").is_server_fault());
        assert!(ServiceError::store_unavailable("refused").is_server_fault());
        assert!(ServiceError::from(anyhow::anyhow!("disk full")).is_server_fault());

        assert!(!ServiceError::InvalidCredential.is_server_fault());
        assert!(!ServiceError::conflict("User", "a@x.com").is_server_fault());
        assert!(!ServiceError::invalid_token().is_server_fault());
        assert!(!ServiceError::invalid_input("email: required").is_server_fault());
    }

    #[test]
    fn test_invalid_credential_message_does_not_name_a_factor() {
        let message = ServiceError::InvalidCredential.to_string();
        assert_eq!(message, "Invalid email or password");
    }

    #[test]
    fn test_rejection_categories_are_distinct() {
        let kinds = [
            TokenRejection::MissingToken.error_type(),
            TokenRejection::MalformedHeader.error_type(),
            TokenRejection::InvalidToken.error_type(),
        ];
        assert_ne!(kinds[0], kinds[1]);
        assert_ne!(kinds[1], kinds[2]);
        assert_ne!(kinds[0], kinds[2]);
    }
}
