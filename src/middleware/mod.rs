/// HTTP middleware composed in front of the credential endpoints
pub mod rate_limit;

pub use rate_limit::{RateLimitConfig, RateLimitMiddleware};
