//! Custom Axum extractors.

pub mod org_context;
pub mod payload;
pub mod user_auth;

pub use org_context::OrgContext;
pub use payload::{JsonBody, QueryParams};
pub use user_auth::UserAuth;
