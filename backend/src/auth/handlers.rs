//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for login, registration,
//! token refresh and logout, extract the JSON body or bearer token, and
//! delegate to the `auth::service` facade for the actual logic.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::middleware::bearer_token_or_reject;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::database::models::UserId;
use crate::errors::ServiceError;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::Json as ResponseJson,
};
use std::sync::Arc;

type HandlerResult<T> = Result<T, (StatusCode, String)>;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> HandlerResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| service_error_to_http(ServiceError::invalid_input(rejection.body_text())))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(auth): Extension<Arc<AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> HandlerResult<ResponseJson<ApiResponse<LoginResponse>>> {
    let payload = json_body(payload)?;

    match auth.login(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(response, "Login successfully"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(auth): Extension<Arc<AuthService>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> HandlerResult<(StatusCode, ResponseJson<ApiResponse<RegisterResponse>>)> {
    let payload = json_body(payload)?;

    match auth.register(payload).await {
        Ok(response) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(response, "Register Success")),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(auth): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> HandlerResult<ResponseJson<ApiResponse<RefreshTokenResponse>>> {
    let token = bearer_token_or_reject(&headers)?;

    match auth.refresh(token).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(response, "Token refreshed"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle logout request by deleting the caller's session record
#[axum::debug_handler]
pub async fn logout(
    Extension(auth): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> HandlerResult<ResponseJson<ApiResponse<LogoutResponse>>> {
    let token = bearer_token_or_reject(&headers)?;

    match auth.logout(token).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(response, "Logout successfully"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Get the identity behind the presented token
#[axum::debug_handler]
pub async fn me(Extension(user_id): Extension<UserId>) -> ResponseJson<ApiResponse<MeResponse>> {
    ResponseJson(ApiResponse::success(MeResponse { user_id }, "Request successful"))
}
