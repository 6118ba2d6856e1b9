/// Security primitives: password hashing and token issuance
pub mod jwt;
pub mod password;

pub use jwt::{Claims, IssuedToken, TokenIssuer};
pub use password::{hash_password, verify_password};
