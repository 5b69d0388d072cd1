//! tokengate: credential verification, signed bearer tokens and
//! single-active-session enforcement over an external key-value store.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod utils;
