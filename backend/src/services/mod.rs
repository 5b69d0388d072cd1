//! Module for core business logic services.
//!
//! This module encapsulates the credential verifier and the session manager,
//! the two services the authentication facade composes.

pub mod session_manager;
pub mod user_service;
