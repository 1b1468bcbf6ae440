//! Application services shared by route handlers.

pub mod auth;
pub mod consultation;

pub use auth::{AuthError, AuthService};
