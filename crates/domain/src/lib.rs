//! Domain layer for the Prodesk backend.
//!
//! This crate contains:
//! - Domain models (Question, Template, Submission, Organization)
//! - The form pipeline: template composition, schema generation and answer
//!   validation, submission filtering, aggregation and CSV export

pub mod models;
pub mod services;
