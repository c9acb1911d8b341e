//! Request middleware: authentication extractors and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::{CurrentUser, RequireAdmin, RequireAuth};
pub use rate_limit::{RateLimiter, rate_limit_middleware};
