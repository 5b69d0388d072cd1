//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle login, registration, token refresh, logout and the
//! "who am I" probe. They are designed to be nested into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use crate::auth::service::AuthService;
use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

/// Creates the authentication router with all auth-related routes
pub fn auth_router(auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route(
            "/me",
            get(me).layer(middleware::from_fn_with_state(auth.clone(), jwt_auth)),
        )
        .layer(Extension(auth))
}
