//! Cross-cutting request middleware.

pub mod rate_limit;
pub mod security;
pub use rate_limit::{rate_limit, Decision, RateLimiter};
pub use security::security_headers;
