//! Domain services for Prodesk.
//!
//! Services contain the form pipeline logic that operates on domain models.
//! None of them touch the database.

pub mod aggregation;
pub mod composer;
pub mod export;
pub mod fields;
pub mod filter;
pub mod schema;

pub use aggregation::{aggregate, build_dashboard};
pub use composer::{compose, ComposeError};
pub use export::{submissions_to_csv, ExportError};
pub use fields::WellKnownField;
pub use filter::SubmissionFilter;
pub use schema::{FieldError, FieldRule, FieldSchema, FormSchema, SchemaErrors};
