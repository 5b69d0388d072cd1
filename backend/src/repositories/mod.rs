//! Persistence adapters for the two external collaborators of the service:
//! the credential repository and the session store.

pub mod session_store;
pub mod user_repository;
