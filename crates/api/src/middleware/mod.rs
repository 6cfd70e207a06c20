//! Request middleware: bearer-token extractors and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::{OptionalUser, RequireAdmin, RequireUser};
pub use rate_limit::auth_rate_limiter;
