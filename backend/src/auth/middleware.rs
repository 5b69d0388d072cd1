//! Middleware for protecting authenticated routes.
//!
//! This module contains the bearer-token extraction shared by handlers and the
//! middleware that admits a request only if its token is the caller's live
//! session.

use crate::api::common::service_error_to_http;
use crate::auth::service::AuthService;
use crate::errors::{ServiceError, TokenRejection};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// A missing header and a header of the wrong shape are reported as
/// different rejections so clients can tell them apart from a bad token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenRejection> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(TokenRejection::MissingToken)?;

    let value = header
        .to_str()
        .map_err(|_| TokenRejection::MalformedHeader)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(TokenRejection::MalformedHeader)?;

    if token.is_empty() || token.contains(' ') {
        return Err(TokenRejection::MalformedHeader);
    }
    Ok(token)
}

/// Same as [`bearer_token`] but already mapped to an HTTP error.
pub fn bearer_token_or_reject(headers: &HeaderMap) -> Result<&str, (StatusCode, String)> {
    bearer_token(headers).map_err(|reason| service_error_to_http(ServiceError::unauthenticated(reason)))
}

/// JWT session middleware
pub async fn jwt_auth(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let token = bearer_token_or_reject(request.headers())?.to_owned();

    let user_id = auth
        .authenticate(&token)
        .await
        .map_err(service_error_to_http)?;

    // Add the identity to request extensions for use in handlers
    request.extensions_mut().insert(user_id);
    Ok(next.run(request).await)
}
