//! Shared utilities and common types for the Prodesk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Token hashing for session storage
//! - Password hashing with Argon2id
//! - JWT access/refresh tokens
//! - Cursor pagination
//! - Text normalization and answer value parsing

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod text;
pub mod validation;
