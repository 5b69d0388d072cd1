//! Data structures for authentication requests and responses.
//!
//! This module defines the payloads accepted and returned by the
//! authentication facade, used for data transfer between the HTTP layer and
//! the service layer.

use crate::database::models::UserId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Identity asserted by an external identity provider after it has done its
/// own verification. Only the email is trusted for the lookup.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExternalIdentity {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "External id is required"))]
    pub external_id: String,
}

/// Login response containing the session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64, // Token expiration in seconds
}

/// Registration response. No token is issued on registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub email: String,
}

/// Token refresh response
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub removed: bool,
}

/// Identity behind the presented token
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: UserId,
}
