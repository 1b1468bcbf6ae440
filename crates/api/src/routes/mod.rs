//! HTTP route handlers.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod members;
pub mod organizations;
pub mod questions;
pub mod submissions;
pub mod templates;
pub mod users;
