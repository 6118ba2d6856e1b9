pub mod auth;

pub use auth::{change_password, login, logout, signup};

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}
