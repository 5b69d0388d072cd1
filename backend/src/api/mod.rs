//! Top-level HTTP surface.
//!
//! Assembles the service router: a root status endpoint plus the
//! authentication routes nested under `/auth`.

pub mod common;

use crate::api::common::ApiResponse;
use crate::auth::{routes::auth_router, service::AuthService};
use axum::{Router, response::Json, routing::get};
use std::sync::Arc;

/// Builds the application router around an already-wired auth service.
pub fn app_router(auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth_router(auth))
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "tokengate",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to tokengate",
    ))
}
