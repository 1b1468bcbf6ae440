//! Persistence layer for Prodesk.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
