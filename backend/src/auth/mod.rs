//! Authentication module for credentials, sessions, and access control.
//!
//! This module provides the public interface for authentication-related
//! functionality: login, registration, token refresh and logout, plus the
//! middleware guarding session-protected routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
