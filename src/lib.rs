//! authgate: credential issuance and session revocation.
//!
//! Authenticates users by email/password, issues signed bearer tokens,
//! and supports logout and password change through a persistent revocation
//! ledger. Every lifecycle transition leaves a best-effort audit record.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;

pub use error::{AuthError, Result};

#[derive(Clone)]
pub struct AppState {
    pub auth: services::AuthService,
}
