/// Data models for the credential service
pub mod audit;
pub mod revocation;
pub mod user;

pub use audit::{AuditAction, AuditLog};
pub use revocation::RevokedToken;
pub use user::User;
