//! Collection of small, self-contained helpers.
//!
//! Token signing and password hashing live here; neither touches the
//! session store or the credential repository.

pub mod crypto;
pub mod jwt;
