//! Business logic services on top of the repositories.

pub mod auth;
pub mod google;
pub mod mailer;
pub mod pricing;
pub mod tokens;
pub mod uploads;
