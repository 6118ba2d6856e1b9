/// Business logic for the credential service
pub mod audit;
pub mod auth_service;

pub use auth_service::AuthService;
